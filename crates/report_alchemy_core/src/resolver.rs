//! Handler resolution across an ordered list of plugins.
//!
//! Resolution runs in two phases. [`resolve_handler_loaders`] picks the
//! winning loader for every configured type and fails on unknown types
//! without invoking anything. [`resolve_handlers`] then invokes each chosen
//! loader exactly once.

use futures_util::future::try_join_all;
use tracing::debug;

use crate::{AlchemyError, HandlerLoaderMap, HandlerMap, Plugin, ReportEndpoint};

/// Selects the winning loader for every type named in `configuration_list`.
///
/// Plugins are visited in order and later plugins replace loaders from
/// earlier ones. Only types that are actually configured are collected.
/// Every configured type is checked before returning, so an unknown type
/// fails the whole resolution with `unknown_type_error_prefix` followed by
/// the type name.
pub fn resolve_handler_loaders<E, H, F>(
    configuration_list: &[E],
    plugins: &[Plugin],
    type_extractor: F,
    unknown_type_error_prefix: &str,
) -> Result<HandlerLoaderMap<H>, AlchemyError>
where
    E: ReportEndpoint,
    F: Fn(&Plugin) -> Option<&HandlerLoaderMap<H>>,
{
    let mut loaders = HandlerLoaderMap::new();

    for plugin in plugins {
        let Some(plugin_loaders) = type_extractor(plugin) else {
            continue;
        };

        for item in configuration_list {
            if let Some(loader) = plugin_loaders.get(item.report_type()) {
                loaders.insert(item.report_type().to_string(), loader.clone());
            }
        }
    }

    for item in configuration_list {
        if !loaders.contains_key(item.report_type()) {
            return Err(AlchemyError::config(format!(
                "{}{}",
                unknown_type_error_prefix,
                item.report_type()
            )));
        }
    }

    debug!("Resolved loaders for types: {:?}", loaders.keys());

    Ok(loaders)
}

/// Invokes every loader in the map once, concurrently.
///
/// The first loader failure aborts resolution.
pub async fn resolve_handlers<H>(
    loaders: &HandlerLoaderMap<H>,
) -> Result<HandlerMap<H>, AlchemyError> {
    let resolved = try_join_all(loaders.iter().map(|(type_name, load)| {
        let future = load();
        async move {
            let handler = future.await?;
            debug!("Loaded handler for type '{}'", type_name);
            Ok::<_, AlchemyError>((type_name.clone(), handler))
        }
    }))
    .await?;

    Ok(resolved.into_iter().collect())
}
