use std::time::Duration;

// En la barbería hay tres sillas, tres barberos y un sofá para cuatro personas.
pub const CHAIR_CAPACITY: usize = 3;
pub const BARBER_COUNT: usize = 3;
pub const COUCH_CAPACITY: usize = 4;
// como máximo 20 clientes dentro del local (parados, en el sofá o en una silla)
pub const ROOM_CAPACITY: usize = 20;

pub const HAIRCUT_DURATION: Duration = Duration::from_secs(2);
pub const ARRIVAL_INTERVAL: Duration = Duration::from_millis(100);
pub const ARRIVAL_JITTER: Duration = Duration::ZERO;

pub const LOG_LVL_INFO: &str = "info";
pub const LOG_LVL_DEBUG: &str = "debug";
pub const LOG_LVL_TRACE: &str = "trace";

pub const USAGE: &str = "Uso: cargo run --bin barberia-hilzer -- <clientes> \
    [-b <barberos>] [-c <sillas>] [-s <sofa>] [-r <local>] \
    [-t <corte_ms>] [-a <llegada_ms>] [-l <info|debug|trace>]";
