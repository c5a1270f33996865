fn main() {
    if let Err(e) = vyra::cli::run_cli() {
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    }
}
