mod args;

use args::Args;

use std::fs;

use anyhow::{anyhow, Context, Result};
use syc::{codegen, ir, lexer, optimizer, parser};

fn main() -> Result<()> {
    let args = Args::parse();

    let source = fs::read_to_string(&args.input)
        .with_context(|| format!("could not open file: {}", args.input.display()))?;

    let tokens = lexer::lex(&source).map_err(|err| anyhow!("line {}: {err}", err.get_line()))?;

    if args.tokens {
        for token in &tokens {
            println!("{token:?}");
        }
    }

    let program = parser::parse(&tokens).map_err(|err| anyhow!("line {}: {err}", err.get_line()))?;

    let module = ir::emit_ir(program)?;

    if args.ir {
        print!("{module}");
    }

    let module = optimizer::optimize(module);
    let assembly = codegen::generate(&module);

    fs::write(&args.output, assembly)
        .with_context(|| format!("could not write to file: {}", args.output.display()))?;

    Ok(())
}
