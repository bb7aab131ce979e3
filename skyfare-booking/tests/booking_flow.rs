use std::collections::HashMap;
use std::sync::{Arc, Barrier};
use std::thread;

use chrono::{Duration, Utc};

use skyfare_booking::{
    BookingError, BookingLedger, BookingRequest, BookingService, BookingStatus, Passenger,
};
use skyfare_catalog::{Flight, FlightInventory, PricingEngine, SeatMap};
use skyfare_core::{RandomSource, ScriptedRandom, SimulatedGateway, ThreadRandom};

fn date_from_today(days: i64) -> String {
    (Utc::now().date_naive() + Duration::days(days))
        .format("%Y-%m-%d")
        .to_string()
}

fn grid_flight(airline: &str, departure_date: String, base_fare: f64) -> Flight {
    Flight::new(
        airline,
        "HYD",
        "BLR",
        departure_date,
        base_fare,
        SeatMap::grid(4, &['A', 'B', 'C', 'D']),
    )
}

/// Service over the given flights that approves every payment.
fn reliable_service(flights: Vec<Flight>, random: Arc<dyn RandomSource>) -> BookingService {
    let payment = Arc::new(SimulatedGateway::new(0.0, random.clone()));
    BookingService::new(
        Arc::new(FlightInventory::new(flights)),
        Arc::new(BookingLedger::new()),
        PricingEngine::default(),
        payment,
        random,
    )
}

fn request(flight_id: uuid::Uuid, seat: &str, name: &str) -> BookingRequest {
    BookingRequest {
        flight_id,
        seat: seat.to_string(),
        passenger: Passenger::new(name),
        force_payment_failure: false,
    }
}

#[test]
fn quiet_flight_prices_within_demand_band() {
    // 16 of 16 seats free, departure 60 days out: both tier factors are
    // neutral, so the fare is base * demandFactor rounded to tens.
    let service = reliable_service(
        vec![grid_flight("IndiGo", date_from_today(60), 3000.0)],
        Arc::new(ThreadRandom),
    );
    let flight_id = service.inventory().list()[0].id;

    let booking = service
        .create_booking(request(flight_id, "1A", "Asha Rao"))
        .unwrap();

    assert_eq!(booking.status, BookingStatus::Confirmed);
    assert!(
        (2850.0..=3450.0).contains(&booking.price),
        "price {} outside demand band",
        booking.price
    );
    assert_eq!(booking.price % 10.0, 0.0);
}

#[test]
fn scarce_imminent_flight_prices_at_full_surge() {
    // 2 of 16 seats left and departure in 2 days: 1.5 * 1.6 surge.
    let flight = grid_flight("IndiGo", date_from_today(2), 3000.0);
    {
        let mut seats = flight.lock_seats();
        let labels: Vec<String> = seats.iter().map(|(label, _)| label.to_string()).collect();
        for label in labels.iter().take(14) {
            seats.try_reserve(label).unwrap();
        }
    }

    let service = reliable_service(vec![flight], Arc::new(ThreadRandom));
    let flight_id = service.inventory().list()[0].id;

    let free_seat = service
        .get_seat_map(&flight_id)
        .unwrap()
        .into_iter()
        .find(|(_, free)| *free)
        .map(|(label, _)| label)
        .unwrap();
    let booking = service
        .create_booking(request(flight_id, &free_seat, "Asha Rao"))
        .unwrap();

    // 3000 * 2.4 = 7200, times demand in [0.95, 1.15].
    assert!(
        (6840.0..=8280.0).contains(&booking.price),
        "price {} outside surge band",
        booking.price
    );
    assert_eq!(booking.price % 10.0, 0.0);
}

#[test]
fn full_flight_never_confirms() {
    let service = reliable_service(
        vec![Flight::new(
            "SpiceJet",
            "BLR",
            "MUM",
            date_from_today(20),
            3500.0,
            SeatMap::grid(1, &['A', 'B']),
        )],
        Arc::new(ScriptedRandom::constant(0.5)),
    );
    let flight_id = service.inventory().list()[0].id;

    service
        .create_booking(request(flight_id, "1A", "Asha Rao"))
        .unwrap();
    service
        .create_booking(request(flight_id, "1B", "Vikram Iyer"))
        .unwrap();

    for seat in ["1A", "1B"] {
        let err = service
            .create_booking(request(flight_id, seat, "Meera Shah"))
            .unwrap_err();
        assert!(matches!(err, BookingError::SeatAlreadyOccupied { .. }));
    }
    let err = service
        .create_booking(request(flight_id, "2A", "Meera Shah"))
        .unwrap_err();
    assert!(matches!(err, BookingError::InvalidSeat { .. }));
}

#[test]
fn cancel_frees_seat_for_rebooking() {
    let service = reliable_service(
        vec![grid_flight("Air India", date_from_today(30), 4500.0)],
        Arc::new(ScriptedRandom::constant(0.5)),
    );
    let flight_id = service.inventory().list()[0].id;

    let first = service
        .create_booking(request(flight_id, "2C", "Asha Rao"))
        .unwrap();
    service.cancel_booking(&first.pnr).unwrap();

    assert!(service.get_seat_map(&flight_id).unwrap()["2C"]);
    let second = service
        .create_booking(request(flight_id, "2C", "Vikram Iyer"))
        .unwrap();
    assert_eq!(second.status, BookingStatus::Confirmed);

    // History keeps both attempts; the cancelled one stays cancelled.
    let history = service.list_bookings();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].status, BookingStatus::Cancelled);
    assert_eq!(history[1].status, BookingStatus::Confirmed);
}

#[test]
fn racing_bookings_for_one_seat_confirm_exactly_once() {
    let threads = 8;
    let service = Arc::new(reliable_service(
        vec![grid_flight("IndiGo", date_from_today(45), 3000.0)],
        Arc::new(ThreadRandom),
    ));
    let flight_id = service.inventory().list()[0].id;
    let barrier = Arc::new(Barrier::new(threads));

    let handles: Vec<_> = (0..threads)
        .map(|i| {
            let service = Arc::clone(&service);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                service.create_booking(request(flight_id, "3D", &format!("Passenger {i}")))
            })
        })
        .collect();

    let mut confirmed = 0;
    let mut lost_race = 0;
    for handle in handles {
        match handle.join().unwrap() {
            Ok(booking) => {
                assert_eq!(booking.status, BookingStatus::Confirmed);
                confirmed += 1;
            }
            Err(BookingError::SeatAlreadyOccupied { .. }) => lost_race += 1,
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    assert_eq!(confirmed, 1);
    assert_eq!(lost_race, threads - 1);
    assert_eq!(service.inventory().list()[0].seats_available(), 15);

    // At most one confirmed booking may reference a (flight, seat) pair.
    let mut confirmed_per_seat: HashMap<(uuid::Uuid, String), usize> = HashMap::new();
    for booking in service.list_bookings() {
        if booking.status == BookingStatus::Confirmed {
            *confirmed_per_seat
                .entry((booking.flight_id, booking.seat.clone()))
                .or_default() += 1;
        }
    }
    assert!(confirmed_per_seat.values().all(|count| *count == 1));
}

#[test]
fn flights_do_not_contend_with_each_other() {
    let service = Arc::new(reliable_service(
        vec![
            grid_flight("IndiGo", date_from_today(45), 3000.0),
            grid_flight("Air India", date_from_today(50), 4500.0),
        ],
        Arc::new(ThreadRandom),
    ));
    let ids: Vec<_> = service.inventory().list().iter().map(|f| f.id).collect();

    let handles: Vec<_> = ids
        .iter()
        .copied()
        .map(|flight_id| {
            let service = Arc::clone(&service);
            thread::spawn(move || {
                let mut confirmed = 0;
                for row in 1..=4 {
                    for letter in ['A', 'B', 'C', 'D'] {
                        let seat = format!("{row}{letter}");
                        let booking = service
                            .create_booking(request(flight_id, &seat, "Load Test"))
                            .unwrap();
                        assert_eq!(booking.status, BookingStatus::Confirmed);
                        confirmed += 1;
                    }
                }
                confirmed
            })
        })
        .collect();

    let total: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
    assert_eq!(total, 32);
    for flight in service.inventory().list() {
        assert_eq!(flight.seats_available(), 0);
    }
    assert_eq!(service.list_bookings().len(), 32);
}

#[test]
fn availability_always_matches_free_seat_count() {
    let service = reliable_service(
        vec![grid_flight("IndiGo", date_from_today(30), 3000.0)],
        Arc::new(ScriptedRandom::constant(0.5)),
    );
    let flight_id = service.inventory().list()[0].id;

    let check = |service: &BookingService| {
        let seat_map = service.get_seat_map(&flight_id).unwrap();
        let free = seat_map.values().filter(|is_free| **is_free).count();
        let summary = &service.list_flights()[0];
        assert_eq!(summary.available_seats, free);
    };

    check(&service);
    let a = service
        .create_booking(request(flight_id, "1A", "Asha Rao"))
        .unwrap();
    check(&service);
    service
        .create_booking(request(flight_id, "1B", "Vikram Iyer"))
        .unwrap();
    check(&service);
    service.cancel_booking(&a.pnr).unwrap();
    check(&service);
}
