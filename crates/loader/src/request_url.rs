//! Request URL construction.

use crate::CallbackMode;
use maploader_types::LoadRequest;
use url::Url;

/// Build the script source URL for a load request.
///
/// Keys are emitted in a fixed order (`key`, `w`, `region`, `language`,
/// `libraries`, then `loading` and `callback` in global-callback mode) and
/// values are form-encoded. Any query already on `endpoint` is replaced.
pub fn script_url(endpoint: &Url, request: &LoadRequest, callback: &CallbackMode) -> Url {
    let mut url = endpoint.clone();
    {
        let mut pairs = url.query_pairs_mut();
        pairs
            .clear()
            .append_pair("key", &request.resource_key)
            .append_pair("w", "weekly")
            .append_pair("region", &request.region)
            .append_pair("language", &request.locale)
            .append_pair("libraries", &request.libraries.to_query_value());

        if let CallbackMode::Global { name } = callback {
            pairs.append_pair("loading", "async").append_pair("callback", name);
        }
    }
    url
}
