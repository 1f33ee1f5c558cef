//! Device description parsing (`tr64desc.xml`, `igddesc.xml`).

use crate::collector::traits::DeviceError;

/// A service advertised in a device description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Service {
    /// Short name derived from the service id (e.g. "WANCommonIFC1").
    pub name: String,
    /// Full service type URN, used in the SOAP action header.
    pub service_type: String,
    /// Path accepting SOAP requests for this service.
    pub control_url: String,
}

/// Extract all services from a description document.
///
/// Services missing a type, id or control URL are ignored.
pub fn parse_services(xml: &str) -> Result<Vec<Service>, DeviceError> {
    let doc = roxmltree::Document::parse(xml)?;

    let services = doc
        .descendants()
        .filter(|n| n.is_element() && n.tag_name().name() == "service")
        .filter_map(|node| {
            let service_type = child_text(node, "serviceType")?;
            let service_id = child_text(node, "serviceId")?;
            let control_url = child_text(node, "controlURL")?;
            Some(Service {
                name: service_name(service_id).to_string(),
                service_type: service_type.to_string(),
                control_url: control_url.to_string(),
            })
        })
        .collect();

    Ok(services)
}

/// `urn:upnp-org:serviceId:WANCommonIFC1` -> `WANCommonIFC1`
fn service_name(service_id: &str) -> &str {
    service_id.rsplit(':').next().unwrap_or(service_id)
}

fn child_text<'a>(node: roxmltree::Node<'a, '_>, name: &str) -> Option<&'a str> {
    node.children()
        .find(|c| c.is_element() && c.tag_name().name() == name)
        .and_then(|c| c.text())
        .map(str::trim)
        .filter(|s| !s.is_empty())
}
