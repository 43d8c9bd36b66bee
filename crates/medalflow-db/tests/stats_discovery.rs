//! Discovery outcomes are observable only through logs; these tests capture
//! them with a subscriber layer.

use medalflow_core::ValidationError;
use medalflow_db::{
	ConfiguredStatsProvider, CreateStatistics, DiscoveryError, ObjectTarget, QueryMetadata,
	StatsColumnProvider,
};
use rstest::rstest;
use serial_test::serial;
use std::sync::{Arc, Mutex};
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;

/// Captures `[LEVEL] message` for every event.
struct LogCapture {
	logs: Arc<Mutex<Vec<String>>>,
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for LogCapture {
	fn on_event(
		&self,
		event: &tracing::Event<'_>,
		_ctx: tracing_subscriber::layer::Context<'_, S>,
	) {
		struct MessageVisitor {
			message: String,
		}

		impl tracing::field::Visit for MessageVisitor {
			fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
				if field.name() == "message" {
					self.message = format!("{:?}", value);
				}
			}
		}

		let mut visitor = MessageVisitor {
			message: String::new(),
		};
		event.record(&mut visitor);

		self.logs
			.lock()
			.unwrap()
			.push(format!("[{}] {}", event.metadata().level(), visitor.message));
	}
}

fn capture() -> (Arc<Mutex<Vec<String>>>, tracing::subscriber::DefaultGuard) {
	let logs = Arc::new(Mutex::new(Vec::new()));
	let layer = LogCapture { logs: logs.clone() };
	let guard = tracing_subscriber::registry().with(layer).set_default();
	(logs, guard)
}

fn has_log(logs: &Arc<Mutex<Vec<String>>>, level: &str, message: &str) -> bool {
	logs.lock()
		.unwrap()
		.iter()
		.any(|log| log.starts_with(&format!("[{level}]")) && log.contains(message))
}

fn target() -> ObjectTarget {
	ObjectTarget::new("silver", "customers").unwrap()
}

fn provider() -> ConfiguredStatsProvider {
	ConfiguredStatsProvider::new()
		.with_layer_toml(
			"silver",
			"schema_name = \"silver\"\n\n[table_stats]\ncustomers = [\"customer_id\"]\n",
		)
		.unwrap()
}

#[rstest]
#[serial(discovery_logs)]
fn test_provider_columns_logged_at_info() {
	// Arrange
	let (logs, _guard) = capture();
	let provider = provider();

	// Act
	let stats = CreateStatistics::builder(target())
		.resolve(Some(&provider))
		.unwrap();

	// Assert
	assert_eq!(stats.columns(), ["customer_id"]);
	assert!(
		has_log(&logs, "INFO", "auto-discovered stats columns"),
		"Expected info log, but got: {:?}",
		logs.lock().unwrap()
	);
}

#[rstest]
#[serial(discovery_logs)]
fn test_metadata_columns_skip_provider() {
	// Arrange
	let (logs, _guard) = capture();
	let target = target()
		.with_metadata(QueryMetadata::new().with_stats_columns(["region"]));
	let failing = |_: &str, _: &str| -> Result<Vec<String>, DiscoveryError> {
		panic!("provider must not be called when metadata names columns")
	};

	// Act
	let stats = CreateStatistics::builder(target)
		.resolve(Some(&failing))
		.unwrap();

	// Assert
	assert_eq!(stats.columns(), ["region"]);
	assert!(has_log(&logs, "INFO", "using stats columns from metadata"));
}

#[rstest]
#[serial(discovery_logs)]
fn test_missing_provider_logged_at_debug() {
	let (logs, _guard) = capture();

	let err = CreateStatistics::builder(target()).resolve(None).unwrap_err();

	assert!(matches!(err, ValidationError::NoStatisticsColumns { .. }));
	assert!(has_log(&logs, "DEBUG", "no stats column provider configured"));
}

#[rstest]
#[serial(discovery_logs)]
fn test_provider_failure_is_logged_not_propagated() {
	// Arrange
	let (logs, _guard) = capture();
	let failing = |table: &str, _: &str| -> Result<Vec<String>, DiscoveryError> {
		Err(DiscoveryError::Lookup {
			table: table.to_string(),
			source: "connection reset".into(),
		})
	};
	let provider: &dyn StatsColumnProvider = &failing;

	// Act
	let err = CreateStatistics::builder(target())
		.resolve(Some(provider))
		.unwrap_err();

	// Assert
	assert_eq!(
		err.to_string(),
		"No columns specified for statistics on silver.customers. Either provide columns explicitly or enable auto_discover with a stats column provider configured."
	);
	assert!(
		has_log(&logs, "WARN", "failed to auto-discover stats columns"),
		"Expected warning log, but got: {:?}",
		logs.lock().unwrap()
	);
}

#[rstest]
#[serial(discovery_logs)]
fn test_unavailable_provider_logged_at_debug() {
	// Arrange
	let (logs, _guard) = capture();
	let unavailable = |_: &str, _: &str| -> Result<Vec<String>, DiscoveryError> {
		Err(DiscoveryError::Unavailable("catalog offline".to_string()))
	};
	let provider: &dyn StatsColumnProvider = &unavailable;

	// Act
	let result = CreateStatistics::builder(target()).resolve(Some(provider));

	// Assert
	assert!(matches!(result, Err(ValidationError::NoStatisticsColumns { .. })));
	assert!(
		has_log(&logs, "DEBUG", "stats discovery unavailable"),
		"Expected debug log, but got: {:?}",
		logs.lock().unwrap()
	);
	assert!(!logs.lock().unwrap().iter().any(|log| log.starts_with("[WARN]")));
}

#[rstest]
#[serial(discovery_logs)]
fn test_unknown_table_logged_at_debug() {
	let (logs, _guard) = capture();
	let provider = provider();
	let target = ObjectTarget::new("silver", "invoices").unwrap();

	let result = CreateStatistics::builder(target).resolve(Some(&provider));

	assert!(result.is_err());
	assert!(has_log(&logs, "DEBUG", "stats column provider returned no columns"));
}
