use std::collections::HashSet;

use eyre::Result;
use rust_decimal::Decimal;
use tracing::info;

use crate::{
    models::{NewService, NewUser},
    store::BookingStore,
};

/// Weekdays that receive the default agenda (Tuesday through Saturday).
pub const DEFAULT_OPEN_WEEKDAYS: std::ops::RangeInclusive<i16> = 2..=6;

pub const DEFAULT_TIMES: [&str; 9] = [
    "09:00", "10:00", "11:00", "12:00", "14:00", "15:00", "16:00", "17:00", "18:00",
];

/// (name, description, price in cents, minutes)
const DEFAULT_SERVICES: [(&str, &str, i64, i32); 6] = [
    ("Loiro Milhões", "Loiro radiante e luminoso com técnicas avançadas", 58000, 180),
    ("Iluminados", "Loiros ou morenas iluminadas com mechas naturais", 48000, 150),
    ("Corte Feminino", "Corte completo com finalização profissional", 12000, 60),
    ("Hidratação Profunda", "Tratamento capilar intensivo com produtos premium", 15000, 90),
    ("Escova Progressiva", "Alisamento e tratamento prolongado", 35000, 240),
    ("Coloração Completa", "Coloração total dos fios com produtos de alta qualidade", 28000, 150),
];

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub services: usize,
    pub slots: usize,
    pub admin_created: bool,
}

/// Inserts the default catalogue, weekly agenda and admin account.
///
/// Safe to run repeatedly: existing services (by name), template rows and
/// accounts are left untouched and not counted.
pub async fn seed_defaults(store: &dyn BookingStore, admin: Option<NewUser>) -> Result<SeedReport> {
    let mut report = SeedReport::default();

    let existing: HashSet<String> = store
        .list_services(false)
        .await?
        .into_iter()
        .map(|s| s.name)
        .collect();
    for (name, description, cents, minutes) in DEFAULT_SERVICES {
        if existing.contains(name) {
            continue;
        }
        store
            .create_service(&NewService {
                name: name.to_string(),
                description: description.to_string(),
                price: Decimal::new(cents, 2),
                duration_minutes: minutes,
            })
            .await?;
        report.services += 1;
    }

    for day in DEFAULT_OPEN_WEEKDAYS {
        for time in DEFAULT_TIMES {
            if store.create_slot(day, time).await?.is_some() {
                report.slots += 1;
            }
        }
    }

    if let Some(admin) = admin {
        report.admin_created = store.create_user(&admin).await?.is_some();
    }

    info!(
        "Seed finished: {} services, {} slots, admin created: {}",
        report.services, report.slots, report.admin_created
    );
    Ok(report)
}
