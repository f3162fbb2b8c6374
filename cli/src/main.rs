fn main() {
    if let Err(err) = dbtransformer_cli::run() {
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}
