use crate::cli::run;

pub mod catalog;
pub mod cli;
pub mod config;
pub mod domain;
pub mod http;
pub mod settings;
pub mod source;
pub mod state;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        log::error!("{e:#}");
        std::process::exit(1);
    }
}
