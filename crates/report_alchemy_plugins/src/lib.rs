//! # report_alchemy_plugins
//!
//! Report formats shipped with report-alchemy.
//!
//! - [`default_plugin`] is always loaded first and handles the `junit` type
//!   for both sources and sinks.
//! - [`json_plugin`] handles the `json` type and is enabled by listing
//!   `report-alchemy-json` under `plugins` in the configuration.

pub mod json;
pub mod junit;
pub mod xml;

use std::sync::Arc;

use report_alchemy_core::{
    AlchemyError, Plugin, PluginRegistry, SinkHandler, SourceHandler, loader,
};

/// Specifier of the bundled JSON plugin.
pub const JSON_PLUGIN_NAME: &str = "report-alchemy-json";

/// The built-in plugin.
pub fn default_plugin() -> Plugin {
    Plugin::new()
        .with_source(
            "junit",
            loader(|| async {
                let source = junit::JunitSource::new()?;
                Ok::<_, AlchemyError>(Arc::new(source) as Arc<dyn SourceHandler>)
            }),
        )
        .with_sink(
            "junit",
            loader(|| async { Ok(Arc::new(junit::JunitSink) as Arc<dyn SinkHandler>) }),
        )
}

/// The optional JSON plugin.
pub fn json_plugin() -> Plugin {
    Plugin::new()
        .with_source(
            "json",
            loader(|| async { Ok(Arc::new(json::JsonSource) as Arc<dyn SourceHandler>) }),
        )
        .with_sink(
            "json",
            loader(|| async { Ok(Arc::new(json::JsonSink) as Arc<dyn SinkHandler>) }),
        )
}

/// A registry with every plugin bundled in this crate.
pub fn bundled_registry() -> PluginRegistry {
    let mut registry = PluginRegistry::new();
    registry.register(JSON_PLUGIN_NAME, json_plugin);
    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use report_alchemy_core::{
        Configuration, HandlerLoaderMap, ReportSink, ReportSource,
        resolve_handler_loaders, resolve_handlers, run_report_alchemy,
    };
    use tempfile::tempdir;

    fn sources(plugin: &Plugin) -> Option<&HandlerLoaderMap<Arc<dyn SourceHandler>>> {
        plugin.source_handlers.as_ref()
    }

    #[tokio::test]
    async fn test_default_plugin_loads_junit_handlers() {
        let plugins = vec![default_plugin()];
        let configured = vec![ReportSource::new("junit", "a.xml")];

        let loaders =
            resolve_handler_loaders(&configured, &plugins, sources, "Unknown source type: ")
                .unwrap();
        let handlers = resolve_handlers(&loaders).await.unwrap();

        assert_eq!(handlers.len(), 1);
        assert!(default_plugin().sink_handlers.unwrap().contains_key("junit"));
    }

    #[test]
    fn test_json_is_not_in_default_plugin() {
        let plugins = vec![default_plugin()];
        let configured = vec![ReportSource::new("json", "a.json")];

        let err = resolve_handler_loaders(&configured, &plugins, sources, "Unknown source type: ")
            .err()
            .unwrap();
        assert_eq!(err.to_string(), "Unknown source type: json");
    }

    #[test]
    fn test_bundled_registry() {
        let registry = bundled_registry();
        let plugins = registry
            .load_plugins(&[JSON_PLUGIN_NAME.to_string()])
            .unwrap();

        assert_eq!(plugins.len(), 1);
        assert!(plugins[0].source_handlers.as_ref().unwrap().contains_key("json"));
    }

    #[tokio::test]
    async fn test_junit_to_json_conversion() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("eslint.xml");
        let output = dir.path().join("problems.json");
        std::fs::write(
            &input,
            r#"<testsuites><testsuite name="src/app.js"><testcase name="x"><failure>line 5, col 3, Error - Unexpected token (no-unused-vars)</failure></testcase></testsuite></testsuites>"#,
        )
        .unwrap();

        let config = Configuration {
            sources: vec![ReportSource::new("junit", input.to_str().unwrap())],
            sinks: vec![ReportSink::new("json", output.to_str().unwrap())],
            ..Default::default()
        };
        let plugins = vec![default_plugin(), json_plugin()];

        let count = run_report_alchemy(&config, &plugins).await.unwrap();
        assert_eq!(count, 1);

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(json[0]["filename"], "src/app.js");
        assert_eq!(json[0]["code"], "no-unused-vars");
        assert_eq!(json[0]["start"]["line"], 5);
    }

    #[tokio::test]
    async fn test_invalid_junit_source_fails_before_sink_is_created() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("bad.xml");
        let output = dir.path().join("out.xml");
        std::fs::write(&input, "<testsuite name=\"a\"></testsuite>").unwrap();

        let config = Configuration {
            sources: vec![ReportSource::new("junit", input.to_str().unwrap())],
            sinks: vec![ReportSink::new("junit", output.to_str().unwrap())],
            ..Default::default()
        };

        let err = run_report_alchemy(&config, &[default_plugin()])
            .await
            .unwrap_err();

        assert!(matches!(err, AlchemyError::InvalidSourceData(_)));
        assert!(!output.exists());
    }

    #[tokio::test]
    async fn test_invalid_second_junit_source_keeps_previous_output() {
        let dir = tempdir().unwrap();
        let good = dir.path().join("good.xml");
        let bad = dir.path().join("bad.xml");
        let output = dir.path().join("out.xml");
        std::fs::write(
            &good,
            r#"<testsuites><testsuite name="a.js"><testcase name="x"><failure>line 1, col 1, Error - Boom (rule)</failure></testcase></testsuite></testsuites>"#,
        )
        .unwrap();
        std::fs::write(&bad, "<testsuite name=\"b.js\"></testsuite>").unwrap();
        std::fs::write(&output, "PREVIOUS OUTPUT").unwrap();

        let config = Configuration {
            sources: vec![
                ReportSource::new("junit", good.to_str().unwrap()),
                ReportSource::new("junit", bad.to_str().unwrap()),
            ],
            sinks: vec![ReportSink::new("junit", output.to_str().unwrap())],
            ..Default::default()
        };

        let err = run_report_alchemy(&config, &[default_plugin()])
            .await
            .unwrap_err();

        assert!(matches!(err, AlchemyError::InvalidSourceData(_)));
        assert_eq!(std::fs::read_to_string(&output).unwrap(), "PREVIOUS OUTPUT");
    }
}
