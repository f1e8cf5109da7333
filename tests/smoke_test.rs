//! Smoke test to verify basic functionality

use schemagen::{parse_csharp, Generator, GeneratorConfig, Strategy};

#[test]
fn smoke_test_csharp_source_to_artifacts() {
    let compilation = parse_csharp(
        r#"
namespace Demo;

[AutoClassBuilder]
public class Address
{
    public string? City { get; set; }
    public string? State { get; set; }
}

[Cloneable]
public partial class Note
{
    public string? Title { get; set; }
    public List<Note>? Replies { get; set; }
}
"#,
    )
    .unwrap();

    let mut generator = Generator::new(GeneratorConfig::default()).unwrap();
    let output = generator.run(&compilation);

    // Basic sanity checks
    assert!(output.failures.is_empty());
    assert!(output.diagnostics.is_empty());
    assert!(output.artifact("Demo.Address", Strategy::Builder).is_some());
    assert!(output.artifact("Demo.Note", Strategy::Cloneable).is_some());
    assert_eq!(output.stats.computed, 2);
    assert!(!schemagen::VERSION.is_empty());
}
