use std::process::ExitCode;

fn main() -> ExitCode {
    match barberia::run() {
        Ok(summary) => {
            println!(
                "Todos los clientes fueron atendidos! ({} atendidos, {} rechazados)",
                summary.served, summary.rejected
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("Error: {}", err);
            ExitCode::FAILURE
        }
    }
}
