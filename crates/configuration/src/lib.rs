use core_types::MetricCatalog;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod logging;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use error::ConfigError;
pub use logging::init_tracing;
pub use settings::{
    Annualization, ChartSpec, DashboardSettings, LoggingSettings, MetricCard, RiskSettings,
    RollingSettings, Settings,
};

/// Loads the application configuration.
///
/// Reads `tearsheet.toml` from the working directory when present, then applies
/// `TEARSHEET__SECTION__KEY` environment overrides, and validates the result
/// against `catalog`.
pub fn load_config(catalog: &MetricCatalog) -> Result<Settings, ConfigError> {
    let builder = config::Config::builder()
        .add_source(config::File::with_name("tearsheet").required(false))
        .add_source(config::Environment::with_prefix("TEARSHEET").separator("__"));
    finish(builder, catalog)
}

/// Loads the configuration from an explicit file path.
pub fn load_config_from(path: &Path, catalog: &MetricCatalog) -> Result<Settings, ConfigError> {
    let builder = config::Config::builder()
        .add_source(config::File::from(path))
        .add_source(config::Environment::with_prefix("TEARSHEET").separator("__"));
    finish(builder, catalog)
}

/// Loads the configuration from an in-memory TOML document.
pub fn load_config_str(toml: &str, catalog: &MetricCatalog) -> Result<Settings, ConfigError> {
    let builder = config::Config::builder()
        .add_source(config::File::from_str(toml, config::FileFormat::Toml));
    finish(builder, catalog)
}

fn finish(
    builder: config::ConfigBuilder<config::builder::DefaultState>,
    catalog: &MetricCatalog,
) -> Result<Settings, ConfigError> {
    // Attempt to deserialize the entire configuration into our `Settings` struct
    let settings = builder.build()?.try_deserialize::<Settings>()?;
    settings.validate(catalog)?;
    tracing::debug!(?settings, "Configuration loaded");
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::{ConfigurationError, MetricId, RollingMetric};

    fn catalog() -> MetricCatalog {
        MetricCatalog::standard()
    }

    #[test]
    fn empty_document_yields_defaults() {
        let settings = load_config_str("", &catalog()).unwrap();
        assert_eq!(settings.annualization.periods_per_year, None);
        assert_eq!(settings.rolling.window, None);
        assert_eq!(settings.rolling.trailing_months, vec![3, 6, 12]);
        assert_eq!(settings.rolling.metrics.len(), RollingMetric::ALL.len());
        assert_eq!(settings.risk.var_confidence, 0.95);
        assert_eq!(settings.dashboard.cards.len(), 4);
    }

    #[test]
    fn full_document_is_parsed() {
        let toml = r#"
            [annualization]
            periods_per_year = 12.0

            [rolling]
            window = 24
            metrics = ["sharpe", "var", "trailing_return"]
            trailing_months = [6]

            [dashboard]
            max_cols = 3

            [[dashboard.cards]]
            title = "Calmar"
            value_key = "calmar_ratio"

            [[dashboard.charts]]
            title = "Half-year return"
            series = "trailing_return_6m"
        "#;
        let settings = load_config_str(toml, &catalog()).unwrap();
        assert_eq!(settings.annualization.periods_per_year, Some(12.0));
        assert_eq!(settings.rolling.window, Some(24));
        assert_eq!(
            settings.rolling.metrics,
            vec![RollingMetric::Sharpe, RollingMetric::ValueAtRisk, RollingMetric::TrailingReturn]
        );
        assert_eq!(settings.dashboard.cards[0].value_key, MetricId::CalmarRatio);
        assert_eq!(settings.dashboard.charts[0].series, "trailing_return_6m");
    }

    #[test]
    fn unknown_value_key_fails_at_load_time() {
        let toml = r#"
            [[dashboard.cards]]
            title = "Annual"
            value_key = "annual_return"
        "#;
        assert!(matches!(
            load_config_str(toml, &catalog()),
            Err(ConfigError::LoadError(_))
        ));
    }

    #[test]
    fn window_below_two_is_rejected() {
        let toml = "[rolling]\nwindow = 1\n";
        assert!(matches!(
            load_config_str(toml, &catalog()),
            Err(ConfigError::Invalid(ConfigurationError::InvalidWindow(1)))
        ));
    }

    #[test]
    fn chart_must_reference_a_produced_series() {
        let toml = r#"
            [rolling]
            metrics = ["sharpe"]

            [[dashboard.charts]]
            title = "Vol"
            series = "rolling_volatility"
        "#;
        assert!(matches!(
            load_config_str(toml, &catalog()),
            Err(ConfigError::Invalid(ConfigurationError::UnknownSeries(name)))
                if name == "rolling_volatility"
        ));
    }

    #[test]
    fn zero_trailing_horizon_is_rejected() {
        let toml = "[rolling]\ntrailing_months = [3, 0]\n";
        assert!(matches!(
            load_config_str(toml, &catalog()),
            Err(ConfigError::Invalid(ConfigurationError::InvalidTrailingMonths(0)))
        ));
    }

    #[test]
    fn var_confidence_must_lie_strictly_inside_the_unit_interval() {
        for confidence in ["1.0", "0.0", "1.5"] {
            let toml = format!("[risk]\nvar_confidence = {confidence}\n");
            assert!(
                matches!(
                    load_config_str(&toml, &catalog()),
                    Err(ConfigError::Invalid(ConfigurationError::InvalidConfidence(_)))
                ),
                "confidence {confidence} should be rejected"
            );
        }
        let settings = load_config_str("[risk]\nvar_confidence = 0.99\n", &catalog()).unwrap();
        assert_eq!(settings.risk.var_confidence, 0.99);
    }

    #[test]
    fn default_cards_resolve_against_the_catalog() {
        let settings = Settings::default();
        assert_eq!(settings.validate(&catalog()), Ok(()));
        for card in &settings.dashboard.cards {
            assert!(catalog().resolve(card.value_key.as_str()).is_ok());
        }
    }

    #[test]
    fn non_positive_periods_per_year_is_rejected() {
        let toml = "[annualization]\nperiods_per_year = 0.0\n";
        assert!(matches!(
            load_config_str(toml, &catalog()),
            Err(ConfigError::Invalid(ConfigurationError::InvalidPeriodsPerYear(_)))
        ));
    }
}
