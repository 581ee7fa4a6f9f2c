use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use busgen::assemble;
use busgen::generate::{generate_marshal, MarshalRequest};
use busgen::report::MarshalReport;
use busgen::signature::Signature;

#[derive(Parser)]
#[command(name = "busgen")]
#[command(about = "Bus IPC marshalling code generator (signature -> C).", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Emit the marshalling code block for a type signature.
    Marshal {
        #[arg(long)]
        signature: String,
        #[arg(long, default_value = "value")]
        name: String,
        #[arg(long, default_value = "iter")]
        iter_name: String,
        #[arg(long, default_value = "return -1;\n")]
        oom_code: String,
        #[arg(long)]
        report_json: bool,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Emit a complete marshalling function for a type signature.
    Function {
        #[arg(long)]
        signature: String,
        #[arg(long, default_value = "marshal_value")]
        fn_name: String,
        #[arg(long, default_value = "value")]
        name: String,
        #[arg(long, default_value = "iter")]
        iter_name: String,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Validate a type signature.
    Check {
        #[arg(long)]
        signature: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.cmd {
        Cmd::Marshal {
            signature,
            name,
            iter_name,
            oom_code,
            report_json,
            out,
        } => {
            let req = MarshalRequest {
                signature: &signature,
                iter_name: &iter_name,
                name: &name,
                oom_code: &oom_code,
            };
            let output = generate_marshal(&req)
                .with_context(|| format!("generate marshalling code for {signature:?}"))?;
            if report_json {
                let report = MarshalReport::new(&signature, &output);
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                emit(&output.code, out)?;
            }
        }
        Cmd::Function {
            signature,
            fn_name,
            name,
            iter_name,
            out,
        } => {
            let code = assemble::marshal_function(&signature, &fn_name, &iter_name, &name)
                .with_context(|| format!("generate marshalling function for {signature:?}"))?;
            emit(&code, out)?;
        }
        Cmd::Check { signature } => {
            Signature::parse(&signature)
                .with_context(|| format!("check signature {signature:?}"))?;
            println!("ok");
        }
    }

    Ok(())
}

fn emit(code: &str, out: Option<PathBuf>) -> Result<()> {
    match out {
        Some(path) => {
            fs::write(&path, code).with_context(|| format!("write {}", path.display()))?
        }
        None => print!("{code}"),
    }
    Ok(())
}
