use easyeda_kiconv::{
    ArtifactStatus,
    config::GenerateOptions,
    easyeda_models::{ComponentInfo, ComponentSource, DeclaredBox, FootprintSource, SymbolSource},
    emitter::Schema,
    error::Error,
    file_writer::{FootprintLibrary, LibraryStore, SymbolLibrary},
    generate_symbol, write_component,
};
use std::fs;
use std::path::PathBuf;

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("easyeda_kiconv_{}_{}", name, std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn component(name: &str) -> ComponentSource {
    ComponentSource {
        info: ComponentInfo {
            name: name.to_string(),
            prefix: "R".to_string(),
            footprint_name: format!("{}_FP", name),
            ..Default::default()
        },
        symbol: Some(SymbolSource {
            shapes: vec!["R~390~290~~~20~20~#880000~1~0~none~gge2~0".to_string()],
            center: (400.0, 300.0),
            size: DeclaredBox {
                width: 20.0,
                height: 20.0,
            },
        }),
        footprint: Some(FootprintSource {
            shapes: vec!["PAD~RECT~4010~3000~4~6~1~~1~0~4008 2997 4012 2997~0~gge6~0".to_string()],
            origin: (4000.0, 3000.0),
        }),
    }
}

fn entry(name: &str, schema: Schema) -> String {
    let options = GenerateOptions {
        schema,
        ..Default::default()
    };
    generate_symbol(&component(name), &options).unwrap()
}

#[test]
fn test_symbol_library_appends_before_footer() {
    for schema in [Schema::Legacy, Schema::Modern] {
        let dir = scratch_dir(&format!("append_{:?}", schema));
        let library = SymbolLibrary::new(&dir, "lcsc", schema);

        assert!(!library.exists("R1").unwrap());
        library.write("R1", &entry("R1", schema), false).unwrap();
        library.write("R2", &entry("R2", schema), false).unwrap();
        assert!(library.exists("R1").unwrap());
        assert!(library.exists("R2").unwrap());
        assert!(!library.exists("R3").unwrap());

        let content = fs::read_to_string(&library.path).unwrap();
        match schema {
            Schema::Legacy => {
                assert!(library.path.ends_with("lcsc.lib"));
                assert!(content.starts_with("EESchema-LIBRARY Version 2.4\n"));
                assert!(content.ends_with("#\n#End Library\n"));
                assert_eq!(content.matches("\nENDDEF\n").count(), 2);
            }
            Schema::Modern => {
                assert!(library.path.ends_with("lcsc.kicad_sym"));
                assert!(content.starts_with("(kicad_symbol_lib (version 20211014)"));
                assert!(content.ends_with("  )\n)\n)\n"));
                assert_eq!(content.matches("\n(symbol \"R").count(), 2);
            }
        }
        assert!(content.find("R1").unwrap() < content.find("R2").unwrap());
        let _ = fs::remove_dir_all(&dir);
    }
}

#[test]
fn test_symbol_library_refuses_or_replaces_existing_entry() {
    for schema in [Schema::Legacy, Schema::Modern] {
        let dir = scratch_dir(&format!("replace_{:?}", schema));
        let library = SymbolLibrary::new(&dir, "lcsc", schema);
        library.write("R1", &entry("R1", schema), false).unwrap();
        library.write("R2", &entry("R2", schema), false).unwrap();

        let again = library.write("R1", &entry("R1", schema), false);
        assert!(matches!(again, Err(Error::AlreadyExists(_))));

        let before = fs::read_to_string(&library.path).unwrap();
        library.write("R1", &entry("R1", schema), true).unwrap();
        let after = fs::read_to_string(&library.path).unwrap();
        assert_eq!(before, after);
        let _ = fs::remove_dir_all(&dir);
    }
}

#[test]
fn test_modern_entry_with_quoted_name_is_found_again() {
    let dir = scratch_dir("quoted_name");
    let library = SymbolLibrary::new(&dir, "lcsc", Schema::Modern);
    let name = r#"R"10\k"#;
    library.write(name, &entry(name, Schema::Modern), false).unwrap();

    assert!(library.exists(name).unwrap());
    let again = library.write(name, &entry(name, Schema::Modern), false);
    assert!(matches!(again, Err(Error::AlreadyExists(_))));
    library.write(name, &entry(name, Schema::Modern), true).unwrap();

    let content = fs::read_to_string(&library.path).unwrap();
    assert_eq!(content.matches("\n(symbol ").count(), 1);
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn test_footprint_library_layout() {
    let dir = scratch_dir("footprints");
    let library = FootprintLibrary::new(&dir, "lcsc", Schema::Modern);

    assert!(!library.exists("R1_FP").unwrap());
    library.write("R1_FP", "(footprint \"R1_FP\")\n", false).unwrap();
    assert!(dir.join("lcsc.pretty/R1_FP.kicad_mod").is_file());
    assert!(dir.join("lcsc.3dshapes").is_dir());
    assert!(library.exists("R1_FP").unwrap());

    let again = library.write("R1_FP", "changed", false);
    assert!(matches!(again, Err(Error::AlreadyExists(_))));
    library.write("R1_FP", "changed", true).unwrap();
    assert_eq!(
        fs::read_to_string(dir.join("lcsc.pretty/R1_FP.kicad_mod")).unwrap(),
        "changed"
    );

    let legacy = FootprintLibrary::new(&dir, "lcsc", Schema::Legacy);
    assert!(legacy.entry_path("R1_FP").ends_with("lcsc.pretty/R1_FP.mod"));
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn test_write_component_reports_each_artifact() {
    let dir = scratch_dir("write_component");
    let source = component("R1");
    let options = GenerateOptions::default();

    let report = write_component(&source, &dir, &options).unwrap();
    assert_eq!(report.symbol, ArtifactStatus::Written("R1".to_string()));
    assert_eq!(report.footprint, ArtifactStatus::Written("R1_FP".to_string()));

    let second = write_component(&source, &dir, &options).unwrap();
    assert_eq!(second.symbol, ArtifactStatus::Kept("R1".to_string()));
    assert_eq!(second.footprint, ArtifactStatus::Kept("R1_FP".to_string()));

    let symbols_off = GenerateOptions {
        symbol: false,
        overwrite: true,
        ..Default::default()
    };
    let third = write_component(&source, &dir, &symbols_off).unwrap();
    assert_eq!(third.symbol, ArtifactStatus::Disabled);
    assert_eq!(third.footprint, ArtifactStatus::Written("R1_FP".to_string()));
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn test_failed_footprint_leaves_no_directories() {
    let dir = scratch_dir("failed_footprint");
    let mut source = component("R1");
    source.info.footprint_name.clear();

    let result = write_component(&source, &dir, &GenerateOptions::default());
    assert!(matches!(result, Err(Error::MissingData(_))));
    assert!(!dir.join("lcsc.pretty").exists());
    assert!(!dir.join("lcsc.3dshapes").exists());
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn test_options_from_json() {
    let options = GenerateOptions::from_json("{}").unwrap();
    assert_eq!(options, GenerateOptions::default());
    assert_eq!(options.schema, Schema::Modern);
    assert_eq!(options.model_dir, "${KIPRJMOD}/lcsc.3dshapes");

    let legacy = GenerateOptions::from_json(r#"{"schema": "legacy", "library_name": "parts"}"#).unwrap();
    assert_eq!(legacy.schema, Schema::Legacy);
    assert_eq!(legacy.footprint_ref("SOT-23"), "parts:SOT-23");

    assert!(matches!(
        GenerateOptions::from_json(r#"{"symbol_scale": -1}"#),
        Err(Error::InvalidOption(_))
    ));
    assert!(matches!(
        GenerateOptions::from_json(r#"{"schema": "fancy"}"#),
        Err(Error::JsonError(_))
    ));
}
