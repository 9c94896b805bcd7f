use std::collections::HashMap;
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use barberia::barbershop::config::ShopConfig;
use barberia::barbershop::error::BarberShopError;
use barberia::barbershop::events::{ChannelSink, Occupancy, RecordingSink, ShopEvent};
use barberia::barbershop::shop::{BarberShop, RunSummary};

const WATCHDOG: Duration = Duration::from_secs(60);

/// Corre la barbería en otro hilo para poder fallar si no termina.
fn run_shop(config: ShopConfig) -> (RunSummary, Vec<(ShopEvent, Occupancy)>, Occupancy) {
    let sink = Arc::new(RecordingSink::new());
    let shop = BarberShop::new(config, sink.clone()).unwrap();
    let monitor = shop.monitor();

    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let _ = tx.send(shop.open());
    });
    let summary = rx
        .recv_timeout(WATCHDOG)
        .expect("the shop did not close in time")
        .unwrap();
    (summary, sink.timeline(), monitor.occupancy().unwrap())
}

fn fast(total_customers: usize) -> ShopConfig {
    ShopConfig::new(total_customers)
        .with_haircut_duration(Duration::from_millis(20))
        .with_arrival_interval(Duration::from_millis(2))
}

fn assert_capacity_invariants(config: &ShopConfig, timeline: &[(ShopEvent, Occupancy)]) {
    for (event, occupancy) in timeline {
        assert!(occupancy.inside() <= config.room_capacity, "{:?} {:?}", event, occupancy);
        assert!(occupancy.couch <= config.couch_capacity, "{:?} {:?}", event, occupancy);
        assert!(occupancy.chairs <= config.chair_capacity, "{:?} {:?}", event, occupancy);
    }
}

fn assert_single_cashier(timeline: &[(ShopEvent, Occupancy)]) {
    let mut paying = None;
    for (event, occupancy) in timeline {
        match *event {
            ShopEvent::PaymentRequested { customer, .. } => {
                assert_eq!(paying, None, "customer {} paid while the cashier was busy", customer);
                assert!(!occupancy.cashier_free);
                paying = Some(customer);
            }
            ShopEvent::PaymentCompleted { customer, .. } => {
                assert_eq!(paying, Some(customer));
                assert!(occupancy.cashier_free);
                paying = None;
            }
            _ => {}
        }
    }
    assert_eq!(paying, None);
}

fn assert_finished_cleanly(config: &ShopConfig, summary: &RunSummary, last: Occupancy) {
    assert_eq!(summary.served + summary.rejected, config.total_customers);
    assert_eq!(summary.haircuts_per_barber.len(), config.barber_count);
    assert_eq!(summary.haircuts_per_barber.iter().sum::<usize>(), summary.served);
    assert_eq!(
        last,
        Occupancy {
            waiting: 0,
            couch: 0,
            chairs: 0,
            cashier_free: true,
            pending: 0,
        }
    );
}

#[test]
fn test_five_customers_in_the_classic_shop_are_all_served() {
    let config = fast(5);
    let (summary, timeline, last) = run_shop(config.clone());

    assert_eq!(summary.served, 5);
    assert_eq!(summary.rejected, 0);
    assert_finished_cleanly(&config, &summary, last);
    assert_capacity_invariants(&config, &timeline);
    assert_single_cashier(&timeline);
}

#[test]
fn test_small_room_turns_away_late_arrivals() {
    let config = ShopConfig::new(5)
        .with_room(2)
        .with_haircut_duration(Duration::from_millis(500))
        .with_arrival_interval(Duration::from_millis(10));
    let (summary, timeline, last) = run_shop(config.clone());

    assert_eq!(summary.served, 2);
    assert_eq!(summary.rejected, 3);
    assert_finished_cleanly(&config, &summary, last);
    assert_capacity_invariants(&config, &timeline);

    let rejected: Vec<_> = timeline
        .iter()
        .filter_map(|(event, _)| match event {
            ShopEvent::Rejected { customer } => Some(*customer),
            _ => None,
        })
        .collect();
    assert_eq!(rejected, vec![2, 3, 4]);
    assert_eq!(timeline.iter().map(|(_, o)| o.inside()).max(), Some(2));
}

#[test]
fn test_one_chair_and_one_barber_serve_strictly_one_at_a_time() {
    let config = fast(3).with_chairs(1).with_barbers(1);
    let (summary, timeline, last) = run_shop(config.clone());

    assert_eq!(summary.served, 3);
    assert_eq!(summary.haircuts_per_barber, vec![3]);
    assert_finished_cleanly(&config, &summary, last);

    let mut intervals: HashMap<usize, (usize, usize)> = HashMap::new();
    for (position, (event, _)) in timeline.iter().enumerate() {
        match *event {
            ShopEvent::ServiceStarted { customer, .. } => {
                intervals.entry(customer).or_default().0 = position;
            }
            ShopEvent::PaymentCompleted { customer, .. } => {
                intervals.entry(customer).or_default().1 = position;
            }
            _ => {}
        }
    }
    let mut intervals: Vec<(usize, usize)> = intervals.into_values().collect();
    intervals.sort();
    assert_eq!(intervals.len(), 3);
    for pair in intervals.windows(2) {
        assert!(pair[0].1 < pair[1].0, "overlapping services: {:?}", pair);
    }
}

#[test]
fn test_zero_customers_fail_validation() {
    let result = BarberShop::new(ShopConfig::new(0), Arc::new(RecordingSink::new()));
    assert!(matches!(result, Err(BarberShopError::InvalidConfig(_))));
}

#[test]
fn test_crowded_shop_keeps_invariants_and_terminates() {
    let config = ShopConfig::new(40)
        .with_room(6)
        .with_couch(2)
        .with_chairs(2)
        .with_haircut_duration(Duration::from_millis(3))
        .with_arrival_interval(Duration::ZERO)
        .with_arrival_jitter(Duration::from_millis(2));
    let (summary, timeline, last) = run_shop(config.clone());

    assert_finished_cleanly(&config, &summary, last);
    assert_capacity_invariants(&config, &timeline);
    assert_single_cashier(&timeline);

    let retired = timeline
        .iter()
        .filter(|(event, _)| matches!(event, ShopEvent::BarberRetired { .. }))
        .count();
    assert_eq!(retired, config.barber_count);
    let departed = timeline
        .iter()
        .filter(|(event, _)| matches!(event, ShopEvent::Departed { .. }))
        .count();
    assert_eq!(departed, summary.served);
}

#[test]
fn test_every_served_customer_follows_the_pipeline() {
    let config = fast(8).with_chairs(2).with_barbers(2);
    let (summary, timeline, _) = run_shop(config);

    let mut journeys: HashMap<usize, Vec<ShopEvent>> = HashMap::new();
    for (event, _) in &timeline {
        if let Some(customer) = event.customer() {
            journeys.entry(customer).or_default().push(*event);
        }
    }
    assert_eq!(journeys.len(), 8);

    let mut served = 0;
    for (customer, journey) in journeys {
        if journey == vec![ShopEvent::Rejected { customer }] {
            continue;
        }
        let barber = journey[3].barber().unwrap();
        assert_eq!(
            journey,
            vec![
                ShopEvent::Admitted { customer },
                ShopEvent::SeatedOnCouch { customer },
                ShopEvent::SeatedInChair { customer },
                ShopEvent::ServiceStarted { barber, customer },
                ShopEvent::ServiceFinished { barber, customer },
                ShopEvent::PaymentRequested { customer, barber },
                ShopEvent::PaymentCompleted { customer, barber },
                ShopEvent::Departed { customer },
            ]
        );
        served += 1;
    }
    assert_eq!(served, summary.served);
}

#[test]
fn test_channel_subscriber_sees_the_whole_run() {
    let (tx, rx) = mpsc::channel();
    let config = fast(4);
    let shop = BarberShop::new(config, Arc::new(ChannelSink::new(tx))).unwrap();

    let subscriber = thread::spawn(move || {
        rx.iter()
            .filter(|(event, _)| matches!(event, ShopEvent::Departed { .. }))
            .count()
    });
    let summary = shop.open().unwrap();

    // al cerrar la barbería se suelta el último emisor y el suscriptor termina
    assert_eq!(subscriber.join().unwrap(), summary.served);
}
