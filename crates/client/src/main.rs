//! Damage simulation binary.
//!
//! ```bash
//! RUST_LOG=damage=debug cargo run -p damage-client
//! DAMAGE_DATA_DIR=./data DAMAGE_AUDIT=false cargo run -p damage-client
//! ```

use anyhow::Result;
use damage_client::{Session, SimConfig};

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = SimConfig::from_env();
    tracing::info!("Loading damage content from {}", config.data_dir.display());

    let mut session = Session::load(&config)?;
    let report = session.run()?;

    for entity in &report.entities {
        tracing::info!(
            entity = %entity.entity,
            label = %entity.label,
            total = %entity.total_damage,
            damage = %entity.damage,
            state = ?entity.mob_state,
            "final state"
        );
    }
    tracing::info!("Session complete: {} revive(s)", report.revives);
    Ok(())
}
