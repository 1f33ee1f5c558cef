//! SOAP envelope construction and response decoding.

use crate::collector::traits::DeviceError;
use crate::storage::{FieldValue, RawResponse};

/// Build the request envelope for an argument-less action.
pub fn envelope(service_type: &str, action: &str) -> String {
    format!(
        concat!(
            r#"<?xml version="1.0" encoding="utf-8"?>"#,
            r#"<s:Envelope s:encodingStyle="http://schemas.xmlsoap.org/soap/encoding/" "#,
            r#"xmlns:s="http://schemas.xmlsoap.org/soap/envelope/">"#,
            r#"<s:Body><u:{action} xmlns:u="{service_type}"></u:{action}></s:Body>"#,
            r#"</s:Envelope>"#
        ),
        action = action,
        service_type = service_type,
    )
}

/// Decode the output arguments of `<{action}Response>`.
pub fn parse_response(xml: &str, action: &str) -> Result<RawResponse, DeviceError> {
    let doc = roxmltree::Document::parse(xml)?;
    let expected = format!("{}Response", action);

    let body = doc
        .descendants()
        .find(|n| n.is_element() && n.tag_name().name() == expected)
        .ok_or_else(|| DeviceError::Malformed(format!("missing <{}> element", expected)))?;

    let response = body
        .children()
        .filter(|n| n.is_element())
        .map(|n| {
            let value = n.text().map(FieldValue::parse).unwrap_or_else(|| "".into());
            (n.tag_name().name().to_string(), value)
        })
        .collect();

    Ok(response)
}

/// Decode a SOAP fault carrying a UPnP error.
///
/// Returns `None` if the body is not a recognizable fault.
pub fn parse_fault(xml: &str) -> Option<DeviceError> {
    let doc = roxmltree::Document::parse(xml).ok()?;
    let text_of = |name: &str| {
        doc.descendants()
            .find(|n| n.is_element() && n.tag_name().name() == name)
            .and_then(|n| n.text())
            .map(str::trim)
    };

    let code = text_of("errorCode")?.parse::<u16>().ok()?;
    let description = text_of("errorDescription").unwrap_or_default().to_string();
    Some(DeviceError::Action { code, description })
}

#[cfg(test)]
mod tests {
    use super::*;

    const STATS_RESPONSE: &str = r#"<?xml version="1.0"?>
<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/" s:encodingStyle="http://schemas.xmlsoap.org/soap/encoding/">
<s:Body>
<u:GetStatisticsResponse xmlns:u="urn:dslforum-org:service:WLANConfiguration:1">
<NewTotalPacketsSent>1024</NewTotalPacketsSent>
<NewTotalPacketsReceived>2048</NewTotalPacketsReceived>
<NewStatus>Up</NewStatus>
<NewEmpty></NewEmpty>
</u:GetStatisticsResponse>
</s:Body>
</s:Envelope>"#;

    const FAULT_RESPONSE: &str = r#"<?xml version="1.0"?>
<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/" s:encodingStyle="http://schemas.xmlsoap.org/soap/encoding/">
<s:Body>
<s:Fault>
<faultcode>s:Client</faultcode>
<faultstring>UPnPError</faultstring>
<detail>
<UPnPError xmlns="urn:schemas-upnp-org:control-1-0">
<errorCode>401</errorCode>
<errorDescription>Invalid Action</errorDescription>
</UPnPError>
</detail>
</s:Fault>
</s:Body>
</s:Envelope>"#;

    #[test]
    fn test_envelope() {
        let xml = envelope("urn:dslforum-org:service:WLANConfiguration:1", "GetStatistics");
        assert!(xml.contains(
            r#"<u:GetStatistics xmlns:u="urn:dslforum-org:service:WLANConfiguration:1"></u:GetStatistics>"#
        ));
        // Must itself be well-formed
        assert!(roxmltree::Document::parse(&xml).is_ok());
    }

    #[test]
    fn test_parse_response() {
        let response = parse_response(STATS_RESPONSE, "GetStatistics").unwrap();

        assert_eq!(response.len(), 4);
        assert_eq!(
            response.get("NewTotalPacketsSent"),
            Some(&FieldValue::Integer(1024))
        );
        assert_eq!(
            response.get("NewStatus"),
            Some(&FieldValue::String("Up".to_string()))
        );
        assert_eq!(
            response.get("NewEmpty"),
            Some(&FieldValue::String(String::new()))
        );
    }

    #[test]
    fn test_parse_response_wrong_action() {
        let result = parse_response(STATS_RESPONSE, "GetInfo");
        assert!(matches!(result, Err(DeviceError::Malformed(_))));
    }

    #[test]
    fn test_parse_fault() {
        match parse_fault(FAULT_RESPONSE) {
            Some(DeviceError::Action { code, description }) => {
                assert_eq!(code, 401);
                assert_eq!(description, "Invalid Action");
            }
            other => panic!("expected action error, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_fault_not_a_fault() {
        assert!(parse_fault(STATS_RESPONSE).is_none());
        assert!(parse_fault("not xml").is_none());
    }
}
