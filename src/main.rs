//! rls binary entry point.

fn main() {
    std::process::exit(rls_release::cli::run(std::env::args_os()));
}
