use clap::{Parser, Subcommand};
use std::process::Command;

/// Stagehand 개발 태스크
#[derive(Parser)]
#[command(name = "xtask")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// fmt, clippy, test를 차례로 실행
    Ci {
        /// fmt 검사 생략
        #[arg(long)]
        skip_fmt: bool,
    },
    /// 재고 데모 스위트를 메모리 백엔드로 실행
    Smoke,
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Ci { skip_fmt } => {
            if !skip_fmt {
                cargo("fmt", &["fmt", "--all", "--", "--check"]);
            }
            cargo(
                "clippy",
                &["clippy", "--workspace", "--all-targets", "--", "-D", "warnings"],
            );
            cargo("test", &["test", "--workspace"]);
        }
        Commands::Smoke => {
            cargo(
                "smoke run",
                &[
                    "run",
                    "-p",
                    "inventory-demo",
                    "--",
                    "--config",
                    "demos/inventory/stagehand.toml",
                    "run",
                    "--backend",
                    "memory",
                ],
            );
        }
    }
}

fn cargo(step: &str, args: &[&str]) {
    println!("==> cargo {}", args.join(" "));
    let status = Command::new("cargo")
        .args(args)
        .status()
        .unwrap_or_else(|e| {
            eprintln!("failed to spawn cargo for {step}: {e}");
            std::process::exit(1);
        });
    if !status.success() {
        eprintln!("{step} failed");
        std::process::exit(status.code().unwrap_or(1));
    }
    println!("{step} succeeded");
}
