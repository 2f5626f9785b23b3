// build.rs

use clap::{Arg, Command};
use clap_mangen::Man;
use std::env;
use std::fs;
use std::path::PathBuf;

/// Common argument: database path
fn db_path_arg() -> Arg {
    Arg::new("db_path")
        .short('d')
        .long("db-path")
        .value_name("PATH")
        .help("Path to the database file (overrides storage.db_path)")
}

fn build_cli() -> Command {
    Command::new("recipe-book")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Recipe Book Contributors")
        .about("Small recipe server backed by SQLite")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .global(true)
                .help("Path to a TOML configuration file"),
        )
        .subcommand_required(true)
        .subcommand(
            Command::new("serve")
                .about("Run the HTTP server")
                .arg(
                    Arg::new("bind")
                        .short('b')
                        .long("bind")
                        .value_name("ADDR")
                        .help("Address to bind to (overrides server.bind)"),
                )
                .arg(db_path_arg()),
        )
        .subcommand(
            Command::new("init")
                .about("Create the database and apply schema migrations")
                .arg(db_path_arg()),
        )
        .subcommand(
            Command::new("ci")
                .about("Run CI pipeline tasks: setup, build, test, qa, or all")
                .arg(
                    Arg::new("tasks")
                        .value_name("TASK")
                        .required(true)
                        .num_args(1..)
                        .help("Tasks to run, in order"),
                )
                .arg(
                    Arg::new("project_dir")
                        .short('p')
                        .long("project-dir")
                        .value_name("DIR")
                        .help("Project checkout to build (overrides ci.project_dir)"),
                )
                .arg(
                    Arg::new("dry_run")
                        .long("dry-run")
                        .action(clap::ArgAction::SetTrue)
                        .help("Print the steps without running them"),
                ),
        )
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    let out_dir = match env::var("OUT_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(e) => {
            println!("cargo:warning=OUT_DIR not set: {}", e);
            return;
        }
    };
    let man_dir = out_dir.join("man");

    if let Err(e) = fs::create_dir_all(&man_dir) {
        println!("cargo:warning=Failed to create man directory: {}", e);
        return;
    }

    let man = Man::new(build_cli());
    let mut buffer = Vec::new();

    if let Err(e) = man.render(&mut buffer) {
        println!("cargo:warning=Failed to render man page: {}", e);
        return;
    }

    let man_path = man_dir.join("recipe-book.1");
    if let Err(e) = fs::write(&man_path, buffer) {
        println!("cargo:warning=Failed to write man page: {}", e);
    }
}
