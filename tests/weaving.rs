//! Integration tests for running the purger through the weaving pipeline.

use cilpurge::{prelude::*, weaver::remove_unused_references};

fn fsharp(namespace: &str, name: &str) -> TypeReference {
    TypeReference::external("FSharp.Core", namespace, name)
}

fn runtime(name: &str) -> TypeReference {
    TypeReference::external("System.Runtime", "System", name)
}

/// A library whose only real FSharp.Core usage is compiler bookkeeping, plus one
/// `Console.WriteLine` call.
fn bookkeeping_only_module() -> Module {
    let mut module = Module::new("Pure.dll");
    module.assembly_references = vec![
        AssemblyReference::new("System.Runtime", AssemblyVersion::new(8, 0, 0, 0)),
        AssemblyReference::new("FSharp.Core", AssemblyVersion::new(8, 0, 300, 0)),
        AssemblyReference::new("System.Console", AssemblyVersion::new(8, 0, 0, 0)),
        AssemblyReference::new("System.Linq", AssemblyVersion::new(8, 0, 0, 0)),
    ];

    let mut definition = TypeDefinition::new("Pure", "Program");
    definition.base_type = Some(runtime("Object"));
    definition.custom_attributes = vec![
        CustomAttribute::new(fsharp("Microsoft.FSharp.Core", "CompilationMappingAttribute")),
        CustomAttribute::new(fsharp("Microsoft.FSharp.Core", "AbstractClassAttribute")),
        CustomAttribute::new(fsharp("Microsoft.FSharp.Core", "SealedAttribute")),
    ];

    let body = MethodBody::new()
        .with_instruction("ldstr", Operand::String("hi".to_string()))
        .with_instruction(
            "call",
            Operand::Method(
                MethodReference::new(
                    TypeReference::external("System.Console", "System", "Console"),
                    "WriteLine",
                    runtime("Void"),
                )
                .with_parameter(runtime("String")),
            ),
        )
        .with_instruction("ret", Operand::None);
    let mut main = MethodDefinition::new("main", runtime("Int32"))
        .with_parameter("argv", runtime("String[]"))
        .with_body(body);
    main.custom_attributes.push(CustomAttribute::new(fsharp(
        "Microsoft.FSharp.Core",
        "EntryPointAttribute",
    )));
    definition.methods.push(main);

    module.types.push(definition);
    module
}

#[test]
fn test_pipeline_with_xml_config() -> Result<()> {
    let config = PurgeConfig::from_xml(
        r#"<Weavers><CilPurge RemoveAttributes="EntryPointAttribute" /></Weavers>"#,
    )?;
    assert!(config.is_removable_attribute("EntryPointAttribute"));
    assert_eq!(
        config,
        PurgeConfig::from_xml(r#"<CilPurge RemoveAttributes="EntryPointAttribute" />"#)?
    );

    assert!(matches!(
        PurgeConfig::from_xml(r#"<Weavers><CilPruge /></Weavers>"#),
        Err(Error::Configuration(_))
    ));

    let mut pipeline = WeavingPipeline::new();
    pipeline.register(Box::new(MetadataPurger::new(config)));

    let mut module = bookkeeping_only_module();
    let report = pipeline.run(&mut module)?;

    assert!(!report.diagnostics.has_any());
    assert!(module.types[0].custom_attributes.is_empty());
    assert!(module.types[0].methods[0].custom_attributes.is_empty());

    let names: Vec<&str> = module
        .assembly_references
        .iter()
        .map(|reference| reference.name.as_str())
        .collect();
    assert_eq!(names, vec!["System.Runtime", "System.Console"]);

    let removed: Vec<&str> = report
        .removed_references
        .iter()
        .map(|reference| reference.name.as_str())
        .collect();
    assert_eq!(removed, vec!["System.Linq"]);

    Ok(())
}

#[test]
fn test_pipeline_reports_remaining_dependencies() -> Result<()> {
    let mut module = bookkeeping_only_module();
    let list = fsharp("Microsoft.FSharp.Collections", "FSharpList`1").with_generic_argument(runtime("Int32"));
    let empty = MethodReference::new(list.clone(), "get_Empty", list.clone());
    module.types[0].methods[0]
        .body
        .as_mut()
        .unwrap()
        .instructions
        .insert(
            0,
            Instruction {
                offset: 0,
                mnemonic: "call",
                operand: Operand::Method(empty.clone()),
            },
        );

    let mut pipeline = WeavingPipeline::new();
    pipeline.register(Box::new(MetadataPurger::default()));
    let report = pipeline.run(&mut module)?;

    assert_eq!(report.diagnostics.warning_count(), 1);
    let warning = report.diagnostics.warnings()[0];
    assert_eq!(warning.category, DiagnosticCategory::Method);
    assert_eq!(warning.symbol, Some(empty.to_string()));

    // The operand keeps FSharp.Core referenced, but its AssemblyRef row is gone.
    assert!(module.assembly_reference("FSharp.Core").is_none());
    assert!(module.referenced_assemblies().contains("FSharp.Core"));
    assert!(report.diagnostics.summary().contains("1 warning(s)"));

    Ok(())
}

#[test]
fn test_cleanup_keeps_assemblies_named_by_attribute_arguments() -> Result<()> {
    let mut module = bookkeeping_only_module();
    module
        .assembly_references
        .push(AssemblyReference::new("Converters", AssemblyVersion::new(1, 0, 0, 0)));
    module.types[0].custom_attributes.push(
        CustomAttribute::new(TypeReference::external(
            "System.ComponentModel.Primitives",
            "System.ComponentModel",
            "TypeConverterAttribute",
        ))
        .with_argument(CustomAttributeArgument::Type(
            "Converters.ProgramConverter, Converters, Version=1.0.0.0, Culture=neutral, PublicKeyToken=null"
                .to_string(),
        )),
    );

    let mut pipeline = WeavingPipeline::new();
    pipeline.register(Box::new(MetadataPurger::default()));
    let report = pipeline.run(&mut module)?;

    assert!(module.assembly_reference("Converters").is_some());
    let removed: Vec<&str> = report
        .removed_references
        .iter()
        .map(|reference| reference.name.as_str())
        .collect();
    assert_eq!(removed, vec!["System.Linq"]);
    // The attribute type's own assembly has no AssemblyRef row to keep.
    assert!(module
        .assembly_reference("System.ComponentModel.Primitives")
        .is_none());

    Ok(())
}

#[test]
fn test_cleanup_without_purge_keeps_fsharp_core() {
    let mut module = bookkeeping_only_module();

    let removed = remove_unused_references(&mut module);

    let removed: Vec<String> = removed.into_iter().map(|reference| reference.name).collect();
    assert_eq!(removed, vec!["System.Linq"]);
    assert!(module.assembly_reference("FSharp.Core").is_some());
}

#[test]
fn test_weaver_trait_object() {
    let purger: Box<dyn Weaver> = Box::new(MetadataPurger::default());

    assert_eq!(purger.name(), "CilPurge");
    assert!(purger.should_clean_references());
    assert!(purger.assemblies_for_scanning().is_empty());

    let mut module = bookkeeping_only_module();
    let diagnostics = Diagnostics::new();
    purger.execute(&mut module, &diagnostics).unwrap();
    assert!(module.assembly_reference("FSharp.Core").is_none());
    // The trait call alone does not clean up unused references.
    assert!(module.assembly_reference("System.Linq").is_some());
}
