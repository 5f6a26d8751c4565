//! Object and prototype behavior, driven through source programs.

use brewin_lang::{run, BufferIo, ErrorKind, Options, RunError};
use pretty_assertions::assert_eq;

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn exec(src: &str) -> Result<Vec<String>, RunError> {
    let mut io = BufferIo::new();
    run(src, &mut io, Options::default())?;
    Ok(io.into_lines())
}

fn output(src: &str) -> Vec<String> {
    exec(src).unwrap_or_else(|e| panic!("run failed: {e}"))
}

fn runtime_kind(src: &str) -> ErrorKind {
    match exec(src) {
        Err(RunError::Runtime(e)) => e.kind,
        Err(RunError::Compile(errs)) => panic!("compile failed: {errs:#?}"),
        Ok(out) => panic!("expected runtime error, got {out:?}"),
    }
}

fn lines(expected: &[&str]) -> Vec<String> {
    expected.iter().map(|s| s.to_string()).collect()
}

// ─── Fields ──────────────────────────────────────────────────────────────────

#[test]
fn fields_read_and_write() {
    let out = output(r#"
        func main() {
            p = @;
            p.name = "ann";
            p.age = 30;
            p.age = p.age + 1;
            print(p.name, " ", p.age);
        }
    "#);
    assert_eq!(out, lines(&["ann 31"]));
}

#[test]
fn objects_are_shared_not_copied() {
    let out = output(r#"
        func rename(o) { o.name = "changed"; }
        func main() {
            a = @;
            a.name = "orig";
            b = a;
            rename(b);
            print(a.name);
            print(a == b);
        }
    "#);
    assert_eq!(out, lines(&["changed", "true"]));
}

#[test]
fn nested_dotted_assignment() {
    let out = output(r#"
        func main() {
            a = @;
            a.b = @;
            a.b.c = 5;
            print(a.b.c);
        }
    "#);
    assert_eq!(out, lines(&["5"]));
}

#[test]
fn missing_member_is_name_error() {
    assert_eq!(runtime_kind("func main() { o = @; print(o.nope); }"), ErrorKind::Name);
}

#[test]
fn member_on_nil_is_fault() {
    assert_eq!(runtime_kind("func main() { o = nil; print(o.x); }"), ErrorKind::Fault);
    assert_eq!(runtime_kind("func main() { o = nil; o.x = 1; }"), ErrorKind::Fault);
}

#[test]
fn member_on_primitive_is_type_error() {
    assert_eq!(runtime_kind("func main() { o = 5; print(o.x); }"), ErrorKind::Type);
}

// ─── Prototypes ──────────────────────────────────────────────────────────────

#[test]
fn two_level_prototype_lookup() {
    let out = output(r#"
        func main() {
            base = @;
            base.kind = "base";
            mid = @;
            mid.proto = base;
            leaf = @;
            leaf.proto = mid;
            print(leaf.kind);
        }
    "#);
    assert_eq!(out, lines(&["base"]));
}

#[test]
fn own_field_shadows_prototype() {
    let out = output(r#"
        func main() {
            p = @;
            p.x = 1;
            o = @;
            o.proto = p;
            o.x = 2;
            print(o.x, " ", p.x);
        }
    "#);
    assert_eq!(out, lines(&["2 1"]));
}

#[test]
fn prototype_changes_are_visible() {
    let out = output(r#"
        func main() {
            p = @;
            o = @;
            o.proto = p;
            p.late = "seen";
            print(o.late);
        }
    "#);
    assert_eq!(out, lines(&["seen"]));
}

#[test]
fn prototype_cycle_terminates() {
    let kind = runtime_kind(r#"
        func main() {
            a = @;
            b = @;
            a.proto = b;
            b.proto = a;
            print(a.missing);
        }
    "#);
    assert_eq!(kind, ErrorKind::Name);
}

#[test]
fn proto_must_be_object_or_nil() {
    assert_eq!(runtime_kind("func main() { o = @; o.proto = 3; }"), ErrorKind::Type);
    let out = output(r#"
        func main() {
            p = @;
            p.x = 1;
            o = @;
            o.proto = p;
            o.proto = nil;
            print(o.proto);
        }
    "#);
    assert_eq!(out, lines(&["nil"]));
}

// ─── Methods ─────────────────────────────────────────────────────────────────

#[test]
fn method_binds_this() {
    let out = output(r#"
        func main() {
            c = @;
            c.count = 0;
            c.inc = lambda(by) { this.count = this.count + by; };
            c.inc(2);
            c.inc(3);
            print(c.count);
        }
    "#);
    assert_eq!(out, lines(&["5"]));
}

#[test]
fn inherited_method_binds_receiver() {
    let out = output(r#"
        func main() {
            animal = @;
            animal.speak = lambda() { print(this.name, " speaks"); };
            dog = @;
            dog.proto = animal;
            dog.name = "rex";
            dog.speak();
        }
    "#);
    assert_eq!(out, lines(&["rex speaks"]));
}

#[test]
fn named_function_as_method() {
    let out = output(r#"
        func describe() { return "I am " + this.name; }
        func main() {
            o = @;
            o.name = "obj";
            o.describe = describe;
            print(o.describe());
        }
    "#);
    assert_eq!(out, lines(&["I am obj"]));
}

#[test]
fn calling_non_method_field_is_name_error() {
    assert_eq!(runtime_kind("func main() { o = @; o.x = 1; o.x(); }"), ErrorKind::Name);
}

#[test]
fn missing_method_is_name_error() {
    assert_eq!(runtime_kind("func main() { o = @; o.go(); }"), ErrorKind::Name);
}

#[test]
fn method_arity_mismatch_is_type_error() {
    assert_eq!(
        runtime_kind("func main() { o = @; o.m = lambda(a) { }; o.m(); }"),
        ErrorKind::Type
    );
}
