//! End-to-end scan/merge/fill/submit over the public API

#![allow(clippy::unwrap_used)]

use formfill::{
    AutoFillOptions, FieldType, FieldValue, FormDriver, FormFiller, Locale, MockDriver,
    MockElement,
};

fn checkout_form() -> MockDriver {
    MockDriver::new()
        .with_element(MockElement::input("text").name("full_name").in_form("#checkout"))
        .with_element(MockElement::input("email").id("email").in_form("#checkout"))
        .with_element(MockElement::input("text").id("captcha").in_form("#checkout"))
        .with_element(
            MockElement::input("number")
                .id("qty")
                .attr("min", "1")
                .in_form("#checkout"),
        )
        .with_element(MockElement::input("checkbox").id("gift").in_form("#checkout"))
        .with_element(
            MockElement::select()
                .id("country")
                .option("")
                .option("FR")
                .option("BR")
                .in_form("#checkout"),
        )
        .with_element(
            MockElement::textarea()
                .name("notes")
                .label("Delivery notes")
                .in_form("#checkout"),
        )
        .with_element(
            MockElement::new("button")
                .attr("type", "submit")
                .id("pay")
                .in_form("#checkout"),
        )
        .with_element(MockElement::input("email").id("newsletter").in_form("#footer"))
}

const OPTIONS: &str = r##"
formSelector: "#checkout"
excludeSelectors: ["#captcha"]
submitAfterFill: true
submitSelector: "#pay"
locale: fr_FR
customFields:
  "#qty": { type: number, min: 3, max: 3 }
  "#country": { options: ["BR"] }
"##;

#[tokio::test]
async fn test_checkout_auto_fill() {
    let options = AutoFillOptions::from_yaml_str(OPTIONS).unwrap();
    let filler = FormFiller::new(checkout_form());

    let report = filler.auto_fill_form(&options).await.unwrap();

    let keys: Vec<&str> = report.keys().map(String::as_str).collect();
    assert_eq!(
        keys,
        vec![
            "input[name=\"full_name\"]",
            "#email",
            "#qty",
            "#gift",
            "#country",
            "textarea[name=\"notes\"]",
        ]
    );
    assert_eq!(report["#qty"], FieldValue::Number(3));
    assert_eq!(report["#country"], FieldValue::from("BR"));
    assert!(report["#gift"].as_bool().is_some());

    let driver = filler.driver();
    assert_eq!(driver.find("#qty").unwrap().value, "3");
    assert_eq!(driver.find("#country").unwrap().value, "BR");
    assert_eq!(driver.find("#captcha").unwrap().value, "");
    assert_eq!(driver.find("#newsletter").unwrap().value, "");
    assert!(driver.was_called("click:mock-7"));

    // the call locale does not stick to the filler
    assert_eq!(filler.locale(), Locale::En);
}

#[tokio::test]
async fn test_detected_types() {
    let filler = FormFiller::new(checkout_form());
    let options = AutoFillOptions::new().with_form_selector("#checkout");

    let fields = filler.detect_fields(&options).await.unwrap();
    let types: Vec<FieldType> = fields.iter().map(|f| f.field_type).collect();

    assert_eq!(
        types,
        vec![
            FieldType::Name,
            FieldType::Email,
            FieldType::Text,
            FieldType::Number,
            FieldType::Checkbox,
            FieldType::Select,
            FieldType::Textarea,
        ]
    );
}

#[tokio::test]
async fn test_driver_is_usable_as_trait_object() {
    let driver: Box<dyn FormDriver> = Box::new(checkout_form());
    let found = formfill::scanner::detect(driver.as_ref(), "#footer", &[], 10)
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].selector(), Some("#newsletter"));
}
