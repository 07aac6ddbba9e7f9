use std::sync::Arc;

use anyhow::Context;

use tradefeed_core::SystemClock;
use tradefeed_infra::PublisherConfig;
use tradefeed_infra::messaging::RedisPubSubClient;
use tradefeed_publisher::read_transactions;
use tradefeed_transactions::{PublisherStats, TransactionPublisher};

fn main() -> anyhow::Result<()> {
    tradefeed_observability::init();

    let config = PublisherConfig::from_env().context("invalid publisher configuration")?;
    let input = read_transactions(std::io::stdin().lock()).context("failed to read stdin")?;

    let client = RedisPubSubClient::new(&config.redis_url)
        .with_context(|| format!("invalid redis url {}", config.redis_url))?;
    let stats = Arc::new(PublisherStats::new());

    let publisher = TransactionPublisher::new(client, config.topic.clone(), SystemClock)
        .with_zone(config.zone()?)
        .with_default_retry(config.retry_state())
        .with_listener(stats.clone());

    tracing::info!(
        topic = %config.topic,
        records = input.transactions.len(),
        rejected = input.rejected,
        max_attempts = config.max_attempts,
        "starting publish"
    );

    publisher.publish(&input.transactions);

    let summary = stats.snapshot();
    tracing::info!(
        published = summary.published,
        abandoned = summary.abandoned,
        skipped = summary.skipped,
        unserializable = summary.unserializable,
        "publish finished"
    );

    Ok(())
}
