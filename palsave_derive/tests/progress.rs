#[test]
fn tests() {
    let t = trybuild::TestCases::new();
    t.pass("tests/01-record.rs");
    t.pass("tests/02-nested.rs");
    t.pass("tests/03-generics.rs");
}
