//! Factories for synthetic modules used by unit tests.

use uguid::guid;

use crate::metadata::{
    customattributes::{CustomAttribute, CustomAttributeArgument},
    members::{
        EventDefinition, FieldDefinition, MethodDefinition, PropertyDefinition, TypeDefinition,
    },
    method::{Immediate, MethodBody, Operand},
    module::{AssemblyDefinition, Module},
    references::{
        AssemblyReference, AssemblyVersion, FieldReference, MethodReference, ModuleReference,
        TypeReference,
    },
    token::{table, Token},
};

pub const FSHARP_CORE: &str = "FSharp.Core";

pub fn fsharp_type(namespace: &str, name: &str) -> TypeReference {
    TypeReference::external(FSHARP_CORE, namespace, name)
}

pub fn system_type(name: &str) -> TypeReference {
    TypeReference::external("System.Runtime", "System", name)
}

// Attributes from FSharp.Core live in Microsoft.FSharp.Core, everything else in System
pub fn create_attribute(assembly: &str, name: &str) -> CustomAttribute {
    let namespace = if assembly == FSHARP_CORE {
        "Microsoft.FSharp.Core"
    } else {
        "System"
    };
    CustomAttribute::new(TypeReference::external(assembly, namespace, name))
}

pub fn create_assembly_ref(rid: u32, name: &str) -> AssemblyReference {
    AssemblyReference::new(name, AssemblyVersion::new(8, 0, 0, 0))
        .with_token(Token::from_parts(table::ASSEMBLY_REF, rid))
}

pub fn create_method(rid: u32, name: &str, return_type: TypeReference) -> MethodDefinition {
    let mut method = MethodDefinition::new(name, return_type);
    method.token = Token::from_parts(table::METHOD_DEF, rid);
    method
}

pub fn create_property(name: &str, property_type: TypeReference) -> PropertyDefinition {
    let mut property = PropertyDefinition::new(name, property_type);
    property.token = Token::from_parts(table::PROPERTY, 1);
    property
}

/// A module shaped like the output of the F# compiler for
///
/// ```fsharp
/// [<AutoOpen>]
/// module Library.Say
///
/// [<Sealed>]
/// type Greeter() =
///     member val Name = "" with get
///     [<CLIEvent>] member _.Greeted = ...
///     member _.Hello(name: string) = printfn "Hello %s" name
/// ```
pub fn create_fsharp_module() -> Module {
    let mut module = Module::new("Library.dll");
    module.mvid = guid!("6f3c8a52-1d4e-4b7a-9c0e-2f5b7d8e9a10");

    let mut assembly = AssemblyDefinition::new("Library", AssemblyVersion::new(1, 0, 0, 0));
    assembly.custom_attributes = vec![
        create_attribute(FSHARP_CORE, "FSharpInterfaceDataVersionAttribute")
            .with_argument(CustomAttributeArgument::I4(2))
            .with_argument(CustomAttributeArgument::I4(0))
            .with_argument(CustomAttributeArgument::I4(0)),
        create_attribute("System.Runtime", "TargetFrameworkAttribute").with_argument(
            CustomAttributeArgument::String(Some(".NETCoreApp,Version=v8.0".to_string())),
        ),
    ];
    module.assembly = Some(assembly);
    module.custom_attributes = vec![create_attribute(FSHARP_CORE, "AutoOpenAttribute")];

    module.assembly_references = vec![
        create_assembly_ref(1, "System.Runtime"),
        create_assembly_ref(2, FSHARP_CORE),
        create_assembly_ref(3, "System.Console"),
    ];
    module.module_references = vec![ModuleReference::new(FSHARP_CORE), ModuleReference::new("kernel32.dll")];

    let mut say = TypeDefinition::new("Library", "Say");
    say.token = Token::from_parts(table::TYPE_DEF, 2);
    say.base_type = Some(system_type("Object"));
    say.custom_attributes = vec![
        create_attribute(FSHARP_CORE, "AutoOpenAttribute"),
        create_attribute(FSHARP_CORE, "CompilationMappingAttribute")
            .with_argument(CustomAttributeArgument::I4(7)),
    ];

    let mut greeter = TypeDefinition::new("", "Greeter");
    greeter.token = Token::from_parts(table::TYPE_DEF, 3);
    greeter.base_type = Some(system_type("Object"));
    greeter.custom_attributes = vec![
        create_attribute(FSHARP_CORE, "SealedAttribute"),
        create_attribute(FSHARP_CORE, "CompilationMappingAttribute"),
        create_attribute(FSHARP_CORE, "ReflectedDefinitionAttribute"),
        create_attribute("System.Runtime", "SerializableAttribute"),
    ];

    let mut name_field = FieldDefinition::new("Name@", system_type("String"));
    name_field.custom_attributes = vec![
        create_attribute(FSHARP_CORE, "DebuggerBrowsableAttribute"),
        create_attribute("System.Runtime", "CompilerGeneratedAttribute"),
    ];
    greeter.fields.push(name_field);

    let mut get_name = create_method(1, "get_Name", system_type("String"));
    get_name
        .custom_attributes
        .push(create_attribute(FSHARP_CORE, "CompilationSourceNameAttribute"));
    let mut name_property = create_property("Name", system_type("String"));
    name_property.getter = Some(get_name.token);
    name_property
        .custom_attributes
        .push(create_attribute(FSHARP_CORE, "CompilationMappingAttribute"));
    greeter.properties.push(name_property);
    greeter.methods.push(get_name);

    let mut greeted = EventDefinition::new(
        "Greeted",
        fsharp_type("Microsoft.FSharp.Control", "FSharpHandler`1").with_generic_argument(system_type("String")),
    );
    greeted
        .custom_attributes
        .push(create_attribute(FSHARP_CORE, "CLIEventAttribute"));
    greeter.events.push(greeted);

    let unit = fsharp_type("Microsoft.FSharp.Core", "Unit");
    let format = fsharp_type("Microsoft.FSharp.Core", "PrintfFormat`4");
    let hello_body = MethodBody::new()
        .with_local(format.clone())
        .with_instruction("ldstr", Operand::String("Hello %s".to_string()))
        .with_instruction(
            "newobj",
            Operand::Method(MethodReference::new(format.clone(), ".ctor", system_type("Void"))),
        )
        .with_instruction(
            "call",
            Operand::Method(
                MethodReference::new(
                    fsharp_type("Microsoft.FSharp.Core", "ExtraTopLevelOperators"),
                    "PrintFormatLine",
                    unit.clone(),
                )
                .with_parameter(format),
            ),
        )
        .with_instruction("ldarg.1", Operand::Argument(1))
        .with_instruction(
            "call",
            Operand::Method(MethodReference::new(
                system_type("String"),
                "Concat",
                system_type("String"),
            )),
        )
        .with_instruction("ldc.i4.s", Operand::Immediate(Immediate::Int8(3)))
        .with_instruction("pop", Operand::None)
        .with_instruction(
            "ldsfld",
            Operand::Field(FieldReference::new(unit.clone(), "value", unit.clone())),
        )
        .with_instruction("ret", Operand::None);
    let mut hello = create_method(2, "Hello", unit.clone())
        .with_parameter("name", system_type("String"))
        .with_body(hello_body);
    hello
        .custom_attributes
        .push(create_attribute(FSHARP_CORE, "CompilationArgumentCountsAttribute"));
    greeter.methods.push(hello);

    let mut shape = TypeDefinition::new("", "Shape");
    shape.token = Token::from_parts(table::TYPE_DEF, 4);
    shape.custom_attributes = vec![
        create_attribute(FSHARP_CORE, "AbstractClassAttribute"),
        create_attribute(FSHARP_CORE, "StructuralEqualityAttribute"),
    ];
    shape.methods.push(create_method(3, "Area", system_type("Double")));
    greeter.nested_types.push(shape);

    say.nested_types.push(greeter);
    module.types.push(say);
    module
}
