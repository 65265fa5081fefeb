use eyre::Result;
use sqlx::{Pool, Postgres};
use tracing::info;

const TABLES: [&str; 5] = [
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        name VARCHAR(100) NOT NULL,
        email VARCHAR(255) NOT NULL UNIQUE,
        password_hash VARCHAR(255) NOT NULL,
        phone VARCHAR(32) NULL,
        birth_date DATE NULL,
        role VARCHAR(16) NOT NULL DEFAULT 'CLIENT',
        created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
        CONSTRAINT valid_role CHECK (role IN ('CLIENT', 'ADMIN'))
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS services (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        name VARCHAR(255) NOT NULL,
        description TEXT NOT NULL DEFAULT '',
        price NUMERIC(10, 2) NOT NULL,
        duration_minutes INTEGER NOT NULL,
        active BOOLEAN NOT NULL DEFAULT TRUE,
        created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
        CONSTRAINT positive_price CHECK (price > 0),
        CONSTRAINT positive_duration CHECK (duration_minutes > 0)
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS available_slots (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        day_of_week SMALLINT NOT NULL,
        time_slot VARCHAR(5) NOT NULL,
        active BOOLEAN NOT NULL DEFAULT TRUE,
        created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
        CONSTRAINT valid_day_of_week CHECK (day_of_week BETWEEN 0 AND 6),
        CONSTRAINT valid_time_slot CHECK (time_slot ~ '^([01][0-9]|2[0-3]):[0-5][0-9]$'),
        CONSTRAINT unique_weekday_time UNIQUE (day_of_week, time_slot)
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS appointments (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        service_id UUID NOT NULL REFERENCES services(id),
        appointment_date DATE NOT NULL,
        appointment_time VARCHAR(5) NOT NULL,
        status VARCHAR(16) NOT NULL DEFAULT 'PENDING',
        notes TEXT NULL,
        justification TEXT NULL,
        justified_at TIMESTAMP WITH TIME ZONE NULL,
        created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
        CONSTRAINT valid_status CHECK (
            status IN ('PENDING', 'CONFIRMED', 'COMPLETED', 'CANCELLED', 'NO_SHOW')
        ),
        CONSTRAINT valid_appointment_time CHECK (
            appointment_time ~ '^([01][0-9]|2[0-3]):[0-5][0-9]$'
        )
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS password_resets (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        token VARCHAR(128) NOT NULL UNIQUE,
        user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        expires_at TIMESTAMP WITH TIME ZONE NOT NULL,
        used BOOLEAN NOT NULL DEFAULT FALSE,
        created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
    );
    "#,
];

const INDEXES: [&str; 6] = [
    // At most one pending or confirmed appointment per (date, time).
    r#"
    CREATE UNIQUE INDEX IF NOT EXISTS idx_appointments_active_slot
        ON appointments(appointment_date, appointment_time)
        WHERE status IN ('PENDING', 'CONFIRMED');
    "#,
    "CREATE INDEX IF NOT EXISTS idx_appointments_user_id ON appointments(user_id);",
    "CREATE INDEX IF NOT EXISTS idx_appointments_date ON appointments(appointment_date);",
    "CREATE INDEX IF NOT EXISTS idx_appointments_status ON appointments(status);",
    "CREATE INDEX IF NOT EXISTS idx_available_slots_day ON available_slots(day_of_week);",
    "CREATE INDEX IF NOT EXISTS idx_password_resets_user_id ON password_resets(user_id);",
];

pub async fn initialize_database(pool: &Pool<Postgres>) -> Result<()> {
    info!("Initializing database schema...");

    for statement in TABLES.iter().chain(INDEXES.iter()) {
        sqlx::query(statement).execute(pool).await?;
    }

    info!("Database schema initialized successfully.");
    Ok(())
}
