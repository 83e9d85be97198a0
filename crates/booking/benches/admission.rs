//! Admission-path benchmarks on the in-memory store.

use std::sync::Arc;

use criterion::{criterion_group, criterion_main, Criterion};
use tokio::runtime::Runtime;

use chrono::{Duration, Utc};
use tripbook_booking::{RegistrationService, TripLedger};
use tripbook_catalog::{Capacity, Client, Country, DateRange, NewClient, Trip};
use tripbook_core::{ClientId, CountryId, TripId};
use tripbook_store::InMemoryBookingStore;

fn seeded_service() -> (RegistrationService, ClientId, TripId) {
    let store = Arc::new(InMemoryBookingStore::new());

    let from = Utc::now() + Duration::days(30);
    let trip = Trip::new(
        TripId::new(),
        "Benchmark trip",
        "",
        DateRange::new(from, from + Duration::days(7)).unwrap(),
        Capacity::new(u32::MAX).unwrap(),
        vec![Country::new(CountryId::new(), "Italy").unwrap()],
    )
    .unwrap();
    let trip_id = trip.id;
    store.seed_trip(trip);

    let client = Client::onboard(
        ClientId::new(),
        NewClient {
            first_name: "Bench".to_string(),
            last_name: "Client".to_string(),
            email: "bench@example.com".to_string(),
            telephone: "+48000000000".to_string(),
            pesel: "90010112345".to_string(),
        },
    )
    .unwrap();
    let client_id = client.id;
    store.seed_client(client);

    let svc = RegistrationService::new(store, Arc::new(TripLedger::default()));
    (svc, client_id, trip_id)
}

fn bench_register_cancel(c: &mut Criterion) {
    let rt = Runtime::new().expect("tokio runtime");
    let (svc, client_id, trip_id) = seeded_service();

    c.bench_function("register_then_cancel", |b| {
        b.iter(|| {
            rt.block_on(async {
                svc.register(client_id, trip_id).await.expect("register");
                svc.cancel(client_id, trip_id).await.expect("cancel");
            })
        })
    });
}

criterion_group!(benches, bench_register_cancel);
criterion_main!(benches);
