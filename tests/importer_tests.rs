use easyeda_kiconv::{
    config::GenerateOptions,
    easyeda_models::{ComponentRef, SourceHost},
    error::Error,
    generate_footprint, generate_symbol, importer,
};
use serde_json::{Value, json};

fn canvas(origin_at: (usize, usize), origin: (&str, &str)) -> String {
    let mut fields = vec!["0"; 20];
    fields[0] = "CA";
    fields[origin_at.0] = origin.0;
    fields[origin_at.1] = origin.1;
    fields.join("~")
}

fn package() -> Value {
    json!({
        "title": "LQFN-56 7x7",
        "dataStr": {
            "head": { "c_para": { "3DModel": "LQFN-56_L7.0", "link": "" } },
            "canvas": canvas((16, 17), ("4000", "3000")),
            "shape": [
                "PAD~RECT~4010~3000~4~6~1~~1~0~4008 2997 4012 2997~0~gge6~0",
                "TRACK~1~3~~3990 2990 4020 2990~gge1~0"
            ]
        }
    })
}

fn product() -> Value {
    json!({
        "docType": 2,
        "description": "Dual-core microcontroller",
        "SMT": true,
        "lcsc": { "number": "C2040", "url": "https://lcsc.com/datasheet/C2040.pdf" },
        "dataStr": {
            "head": { "c_para": { "name": "RP2040", "pre": "U?", "Manufacturer": "Raspberry Pi" } },
            "canvas": canvas((13, 14), ("0", "0")),
            "BBox": { "x": 380, "y": 290, "width": 40, "height": 20 },
            "shape": [
                "R~390~290~~~20~20~#880000~1~0~none~gge2~0",
                "E~400~300~5~5~#880000~1~0~none~gge7~0"
            ]
        },
        "packageDetail": package()
    })
}

#[test]
fn test_import_product_document() {
    let reference = ComponentRef::ByCatalogId("C2040".to_string());
    let source = importer::import_component(&product(), &reference).unwrap();
    let info = &source.info;

    assert_eq!(info.name, "RP2040");
    assert_eq!(info.prefix, "U");
    assert_eq!(info.manufacturer, "Raspberry Pi");
    assert_eq!(info.footprint_name, "LQFN-56_7x7");
    assert_eq!(info.model_3d_name.as_deref(), Some("LQFN-56_L7.0"));
    assert_eq!(info.datasheet, "https://lcsc.com/datasheet/C2040.pdf");
    assert_eq!(info.lcsc_id, "C2040");
    assert_eq!(info.description, "Dual-core microcontroller");
    assert_eq!(info.category, " - ");
    assert!(info.smt);

    let symbol = source.symbol.as_ref().expect("symbol imported");
    assert_eq!(symbol.center, (400.0, 300.0));
    assert_eq!(symbol.size.width, 40.0);
    assert_eq!(symbol.shapes.len(), 2);

    let footprint = source.footprint.as_ref().expect("footprint imported");
    assert_eq!(footprint.origin, (4000.0, 3000.0));
    assert_eq!(footprint.shapes.len(), 2);
}

#[test]
fn test_footprint_link_wins_over_lcsc_url() {
    let mut doc = product();
    doc["packageDetail"]["dataStr"]["head"]["c_para"]["link"] = json!("https://vendor/ds.pdf");
    let source = importer::import_component(&doc, &ComponentRef::ByCatalogId("C2040".into())).unwrap();
    assert_eq!(source.info.datasheet, "https://vendor/ds.pdf");
}

#[test]
fn test_import_footprint_only_document() {
    let mut doc = package();
    doc["docType"] = json!(4);
    let reference = ComponentRef::ByUuid {
        uuid: "0123abcd".to_string(),
        host: SourceHost::Lceda,
    };
    let source = importer::import_component(&doc, &reference).unwrap();

    assert!(source.symbol.is_none());
    assert!(source.footprint.is_some());
    assert_eq!(source.info.footprint_name, "LQFN-56_7x7");
    assert_eq!(source.info.lcsc_id, "");

    let options = GenerateOptions::default();
    assert!(matches!(generate_symbol(&source, &options), Err(Error::MissingData(_))));
    assert!(generate_footprint(&source, &options, None).is_ok());
}

#[test]
fn test_missing_symbol_name_is_fatal() {
    let mut doc = product();
    doc["dataStr"]["head"]["c_para"]
        .as_object_mut()
        .unwrap()
        .remove("name");
    let result = importer::import_component(&doc, &ComponentRef::ByCatalogId("C2040".into()));
    assert!(matches!(result, Err(Error::MissingData(_))));
}

#[test]
fn test_missing_shapes_are_fatal() {
    let mut doc = product();
    doc["packageDetail"]["dataStr"]
        .as_object_mut()
        .unwrap()
        .remove("shape");
    let result = importer::import_component(&doc, &ComponentRef::ByCatalogId("C2040".into()));
    assert!(matches!(result, Err(Error::MissingData(_))));
}

#[test]
fn test_imported_component_generates_both_artifacts() {
    let source =
        importer::import_component(&product(), &ComponentRef::ByCatalogId("C2040".into())).unwrap();
    let options = GenerateOptions::default();

    let symbol = generate_symbol(&source, &options).unwrap();
    assert!(symbol.contains("(property \"Footprint\" \"lcsc:LQFN-56_7x7\""));
    assert!(symbol.contains("(circle (center 0 0) (radius 1.27)"));

    let footprint = generate_footprint(&source, &options, None).unwrap();
    assert!(footprint.starts_with("(footprint \"LQFN-56_7x7\""));
}

#[tokio::test]
#[ignore = "hits the live EasyEDA API"]
async fn test_live_catalog_lookup() {
    let api = easyeda_kiconv::api::EasyedaApi::new().unwrap();
    let reference = ComponentRef::ByCatalogId("C2040".to_string());
    let result = api.fetch(&reference).await.unwrap();
    let source = importer::import_component(&result, &reference).unwrap();
    assert!(source.symbol.is_some());
    assert!(source.footprint.is_some());
}
