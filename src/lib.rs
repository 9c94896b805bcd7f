//! Barbería de Hilzer: tres barberos, tres sillas, un sofá para cuatro, un
//! local para veinte y una sola caja.
//!
//! Todo el estado compartido vive en un monitor (`Mutex` + `Condvar`);
//! clientes y barberos son hilos que avanzan sobre él hasta que no queda
//! ningún cliente pendiente.

pub mod barbershop;

use std::sync::Arc;
use std::time::Duration;

use barbershop::config::ShopConfig;
use barbershop::constants::{LOG_LVL_DEBUG, LOG_LVL_INFO, LOG_LVL_TRACE, USAGE};
use barbershop::error::BarberShopError;
use barbershop::events::TracingSink;
use barbershop::shop::{BarberShop, RunSummary};
use tracing::{info, warn};

pub fn run() -> Result<RunSummary, BarberShopError> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    // todavía no hay logger: los errores de argumentos van directo a stderr
    let (config, log_lvl) = parse_args(&args).map_err(|err| {
        eprintln!("[Barbería] Argumentos inválidos: {}", err);
        eprintln!("{}", USAGE);
        err
    })?;
    init_logger(&log_lvl);
    info!("[Barbería] Configuración: {:?}", config);

    BarberShop::new(config, Arc::new(TracingSink))?.open()
}

fn init_logger(log_lvl: &str) {
    let level = match log_lvl {
        LOG_LVL_TRACE => tracing::Level::TRACE,
        LOG_LVL_DEBUG => tracing::Level::DEBUG,
        _ => tracing::Level::INFO,
    };
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(level)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);

    if ![LOG_LVL_INFO, LOG_LVL_DEBUG, LOG_LVL_TRACE].contains(&log_lvl) {
        warn!("[Barbería] Nivel de log desconocido {}, se usa info", log_lvl);
    }
}

/// `<total_customers> [-b <barbers>] [-c <chairs>] [-s <couch>] [-r <room>]
/// [-t <haircut_ms>] [-a <arrival_ms>] [-l <log_level>]`
pub fn parse_args(args: &[String]) -> Result<(ShopConfig, String), BarberShopError> {
    let Some((total_customers, flags)) = args.split_first() else {
        return Err(BarberShopError::ArgsParsingError(String::from(
            "Falta la cantidad de clientes",
        )));
    };
    let total_customers = parse_positive(total_customers, "cantidad de clientes")?;
    if flags.len() % 2 != 0 {
        return Err(BarberShopError::ArgsParsingError(String::from(
            "Cada opción debe venir con un valor",
        )));
    }

    let mut config = ShopConfig::new(total_customers);
    let mut log_lvl = String::from(LOG_LVL_INFO);
    for flag in flags.chunks_exact(2) {
        match flag[0].as_str() {
            "-b" => config = config.with_barbers(parse_positive(&flag[1], "cantidad de barberos")?),
            "-c" => config = config.with_chairs(parse_positive(&flag[1], "cantidad de sillas")?),
            "-s" => config = config.with_couch(parse_positive(&flag[1], "capacidad del sofá")?),
            "-r" => config = config.with_room(parse_positive(&flag[1], "capacidad del local")?),
            "-t" => {
                config = config.with_haircut_duration(Duration::from_millis(parse_millis(
                    &flag[1],
                    "duración del corte",
                )?))
            }
            "-a" => {
                config = config.with_arrival_interval(Duration::from_millis(parse_millis(
                    &flag[1],
                    "intervalo entre llegadas",
                )?))
            }
            "-l" => log_lvl = flag[1].clone(),
            other => {
                return Err(BarberShopError::ArgsParsingError(format!(
                    "Argumento inválido: {}",
                    other
                )))
            }
        }
    }
    config.validate()?;
    Ok((config, log_lvl))
}

fn parse_positive(value: &str, what: &str) -> Result<usize, BarberShopError> {
    match value.parse::<usize>() {
        Ok(parsed) if parsed > 0 => Ok(parsed),
        _ => Err(BarberShopError::ArgsParsingError(format!(
            "La {} debe ser un entero positivo, se recibió {}",
            what, value
        ))),
    }
}

fn parse_millis(value: &str, what: &str) -> Result<u64, BarberShopError> {
    value.parse::<u64>().map_err(|_| {
        BarberShopError::ArgsParsingError(format!(
            "La {} debe estar en milisegundos, se recibió {}",
            what, value
        ))
    })
}
