/// A SOAP response with two orders, the first with two lines.
pub const SOAP_ORDERS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/" xmlns:m="urn:orders">
  <soap:Header><m:Session id="s-42"/></soap:Header>
  <soap:Body>
    <m:GetOrdersResponse>
      <m:Order id="1001" status="shipped">
        <m:Customer>Ada Lovelace</m:Customer>
        <m:Total currency="EUR">120.50</m:Total>
        <m:Line sku="A-1" qty="2"/>
        <m:Line sku="B-7" qty="1"/>
      </m:Order>
      <m:Order id="1002" status="pending">
        <m:Customer>Alan Turing</m:Customer>
        <m:Total currency="EUR">35</m:Total>
      </m:Order>
    </m:GetOrdersResponse>
  </soap:Body>
</soap:Envelope>"#;

/// Generates `<items>` holding `count` `<item id="i{n}">` elements.
pub fn items(count: usize) -> String {
    let body: String = (0..count)
        .map(|n| format!(r#"<item id="i{n}"><name>item {n}</name></item>"#))
        .collect();
    format!("<items>{}</items>", body)
}

/// A handful of well-formed documents of different shapes.
pub fn assorted_documents() -> Vec<String> {
    vec![
        "<a/>".to_string(),
        r#"<root attr="1"><child>text</child><!-- c --></root>"#.to_string(),
        SOAP_ORDERS.to_string(),
        items(5),
        "<!DOCTYPE r [<!ENTITY e \"ent\">]><r>&e;</r>".to_string(),
    ]
}
