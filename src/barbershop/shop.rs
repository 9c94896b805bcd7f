//! Orquesta una corrida: crea el grupo de barberos, hace llegar a los
//! clientes de a uno y espera a que todos terminen.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use rand::{thread_rng, Rng};
use tracing::{error, info};

use super::barber::Barber;
use super::config::ShopConfig;
use super::customer::{visit, CustomerOutcome};
use super::error::BarberShopError;
use super::events::EventSink;
use super::monitor::{AbandonOnPanic, ShopMonitor};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub served: usize,
    pub rejected: usize,
    pub haircuts_per_barber: Vec<usize>,
}

pub struct BarberShop {
    config: ShopConfig,
    monitor: Arc<ShopMonitor>,
}

impl BarberShop {
    /// Valida la configuración antes de crear cualquier hilo.
    pub fn new(config: ShopConfig, sink: Arc<dyn EventSink>) -> Result<Self, BarberShopError> {
        config.validate()?;
        let monitor = Arc::new(ShopMonitor::new(&config, sink));
        Ok(BarberShop { config, monitor })
    }

    pub fn monitor(&self) -> Arc<ShopMonitor> {
        self.monitor.clone()
    }

    pub fn open(self) -> Result<RunSummary, BarberShopError> {
        info!(
            "[Barbería] Abre con {} barberos, {} sillas, sofá para {} y lugar para {}",
            self.config.barber_count,
            self.config.chair_capacity,
            self.config.couch_capacity,
            self.config.room_capacity
        );

        let barbers_handle: Vec<JoinHandle<Result<usize, BarberShopError>>> =
            (0..self.config.barber_count)
                .map(|id| {
                    let shop = self.monitor.clone();
                    let barber = Barber::new(id, shop.clone(), self.config.haircut_duration);
                    thread::spawn(move || {
                        let _guard = AbandonOnPanic::new(shop);
                        barber.run()
                    })
                })
                .collect();

        let customers_handle: Vec<JoinHandle<Result<CustomerOutcome, BarberShopError>>> =
            (0..self.config.total_customers)
                .map(|id| {
                    thread::sleep(self.arrival_delay());
                    let shop = self.monitor.clone();
                    thread::spawn(move || {
                        let _guard = AbandonOnPanic::new(shop.clone());
                        visit(id, &shop)
                    })
                })
                .collect();

        let mut summary = RunSummary::default();
        let mut first_error = None;
        for handle in customers_handle {
            match join(handle) {
                Ok(CustomerOutcome::Served { .. }) => summary.served += 1,
                Ok(CustomerOutcome::Rejected) => summary.rejected += 1,
                Err(err) => {
                    error!("[Barbería] Un cliente terminó con error: {}", err);
                    keep_worst(&mut first_error, err);
                }
            }
        }

        // por si algún barbero se quedó dormido sin ver el último aviso
        self.monitor.wake_everyone();

        for handle in barbers_handle {
            match join(handle) {
                Ok(haircuts) => summary.haircuts_per_barber.push(haircuts),
                Err(err) => {
                    error!("[Barbería] Un barbero terminó con error: {}", err);
                    keep_worst(&mut first_error, err);
                }
            }
        }

        if let Some(err) = first_error {
            return Err(err);
        }
        info!(
            "[Barbería] Todos los clientes fueron atendidos ({} atendidos, {} rechazados)",
            summary.served, summary.rejected
        );
        Ok(summary)
    }

    fn arrival_delay(&self) -> Duration {
        let jitter_ms = self.config.arrival_jitter.as_millis() as u64;
        if jitter_ms == 0 {
            return self.config.arrival_interval;
        }
        let jitter = Duration::from_millis(thread_rng().gen_range(0..=jitter_ms));
        self.config.arrival_interval + jitter
    }
}

// El pánico de un hilo es la causa; los `ShopAbandoned` y `PoisonedLock` de
// los demás son consecuencia, así que se reporta el pánico.
fn keep_worst(first_error: &mut Option<BarberShopError>, err: BarberShopError) {
    let replace = match first_error {
        None => true,
        Some(BarberShopError::ThreadPanicked(_)) => false,
        Some(_) => matches!(err, BarberShopError::ThreadPanicked(_)),
    };
    if replace {
        *first_error = Some(err);
    }
}

fn join<T>(handle: JoinHandle<Result<T, BarberShopError>>) -> Result<T, BarberShopError> {
    handle
        .join()
        .map_err(|_| BarberShopError::ThreadPanicked(String::from("un hilo entró en pánico")))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::barbershop::events::{Occupancy, RecordingSink, ShopEvent};
    use std::sync::mpsc;

    // se cae en cuanto un barbero termina un corte, con el lock tomado
    struct FaintingSink;

    impl EventSink for FaintingSink {
        fn record(&self, event: ShopEvent, _occupancy: Occupancy) {
            if let ShopEvent::ServiceFinished { .. } = event {
                panic!("el barbero se desmayó");
            }
        }
    }

    #[test]
    fn test_invalid_config_fails_before_opening() {
        let result = BarberShop::new(ShopConfig::new(0), Arc::new(RecordingSink::new()));
        assert!(matches!(result, Err(BarberShopError::InvalidConfig(_))));
    }

    #[test]
    fn test_single_customer_run() {
        let config = ShopConfig::new(1)
            .with_haircut_duration(Duration::from_millis(10))
            .with_arrival_interval(Duration::ZERO);
        let shop = BarberShop::new(config, Arc::new(RecordingSink::new())).unwrap();
        let monitor = shop.monitor();

        let summary = shop.open().unwrap();
        assert_eq!(summary.served, 1);
        assert_eq!(summary.rejected, 0);
        assert_eq!(summary.haircuts_per_barber.iter().sum::<usize>(), 1);
        assert_eq!(monitor.occupancy().unwrap().pending, 0);
    }

    #[test]
    fn test_panicking_barber_is_reported_instead_of_hanging() {
        let config = ShopConfig::new(1)
            .with_barbers(1)
            .with_haircut_duration(Duration::from_millis(5))
            .with_arrival_interval(Duration::ZERO);
        let shop = BarberShop::new(config, Arc::new(FaintingSink)).unwrap();

        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let _ = tx.send(shop.open());
        });
        let result = rx.recv_timeout(Duration::from_secs(10));
        assert!(
            matches!(result, Ok(Err(BarberShopError::ThreadPanicked(_)))),
            "{:?}",
            result
        );
    }

    #[test]
    fn test_thread_panic_wins_over_its_consequences() {
        let mut first_error = None;
        keep_worst(&mut first_error, BarberShopError::PoisonedLock);
        keep_worst(&mut first_error, BarberShopError::ThreadPanicked(String::from("x")));
        keep_worst(&mut first_error, BarberShopError::ShopAbandoned);
        assert_eq!(
            first_error,
            Some(BarberShopError::ThreadPanicked(String::from("x")))
        );
    }

    #[test]
    fn test_arrival_jitter_stays_within_bounds() {
        let config = ShopConfig::new(1)
            .with_arrival_interval(Duration::from_millis(5))
            .with_arrival_jitter(Duration::from_millis(3));
        let shop = BarberShop::new(config, Arc::new(RecordingSink::new())).unwrap();
        for _ in 0..50 {
            let delay = shop.arrival_delay();
            assert!(delay >= Duration::from_millis(5));
            assert!(delay <= Duration::from_millis(8));
        }
    }
}
