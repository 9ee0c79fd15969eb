use std::env;
use std::path::PathBuf;
use std::process::exit;

pub struct Args {
    pub input: PathBuf,
    pub output: PathBuf,
    pub ir: bool,
    pub tokens: bool,
}

impl Args {
    pub fn parse() -> Self {
        let mut args = env::args().skip(1);

        let mut input = None;
        let mut output = None;
        let mut ir = false;
        let mut tokens = false;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "-o" => {
                    let file = args.next().unwrap_or_else(|| Self::usage());
                    output = Some(PathBuf::from(file));
                }
                "-ir" => ir = true,
                "-tokens" => tokens = true,
                "-h" | "--help" => Self::usage(),
                _ => {
                    if input.is_some() {
                        Self::usage();
                    }
                    input = Some(PathBuf::from(arg));
                }
            }
        }

        let input = input.unwrap_or_else(|| Self::usage());
        let output = output.unwrap_or_else(|| PathBuf::from("a.s"));

        Self {
            input,
            output,
            ir,
            tokens,
        }
    }

    #[allow(clippy::items_after_statements)]
    fn usage() -> ! {
        let cmd0 = env::args().next().unwrap_or("syc".to_owned());
        let usage_msg = format!("Usage: {cmd0} <input> [-o <output>] [-ir] [-tokens]\n");
        static OPTIONS: &str = concat!(
            "Options:\n",
            "  -h, --help   Show this message\n",
            "  -o <file>    Output assembly file (default: a.s)\n",
            "  -ir          Dump the intermediate representation\n",
            "  -tokens      Dump the lexer output\n",
        );
        print!("SyC compiler\n\n{usage_msg}\n{OPTIONS}");
        exit(0)
    }
}
