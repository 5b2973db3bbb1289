//! End-to-end lowering tests over the sample description

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::cell::RefCell;
use std::path::PathBuf;
use sysdesc_compiler::ir::IntTypeCommon;
use sysdesc_compiler::{
    compile, compile_with, BuiltinRegistry, Description, Dir, LowerError, LowerResult, Lowerer,
    Resolution, StructKey, TargetConfig, Type, TypeDesc, TypeRef, TypeRegistry,
};

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn sample() -> Description {
    let _ = env_logger::builder().is_test(true).try_init();
    Description::from_file(&fixtures_dir().join("sample.json")).expect("failed to load sample")
}

// ────────────────────────────────────────────────────────────────────────────
// Output shape
// ────────────────────────────────────────────────────────────────────────────

#[test]
fn test_sample_resources() {
    let prog = compile(&sample(), &TargetConfig::default()).unwrap();
    let names: Vec<_> = prog.resources.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["fd", "pid", "sock", "sock_tcp"]);

    let tcp = prog.resource("sock_tcp").unwrap();
    assert_eq!(tcp.kind, vec!["fd", "sock", "sock_tcp"]);
    assert_eq!(tcp.values, vec![0xffff_ffff, 0xffff_ff9c, 3]);
    assert_eq!(tcp.ty.size(), 4);

    let sock = prog.resource("sock").unwrap();
    assert_eq!(sock.values, vec![0xffff_ffff, 0xffff_ff9c]);
}

#[test]
fn test_sample_syscalls() {
    let prog = compile(&sample(), &TargetConfig::default()).unwrap();
    let names: Vec<_> = prog.syscalls.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "getpid",
            "ioctl$SIOCGIFCONF",
            "mount",
            "open",
            "read",
            "setpriority",
            "syz_test$proc"
        ]
    );

    let open = prog.syscall("open").unwrap();
    assert_eq!(open.nr, Some(2));
    match open.ret.as_ref().unwrap() {
        Type::Resource(r) => assert_eq!(r.resource, "fd"),
        other => panic!("expected resource, got {:?}", other),
    }
    match &open.args[0] {
        Type::Ptr(p) => match p.elem.as_ref() {
            Type::Buffer(b) => assert_eq!(b.values, vec!["/dev/null"]),
            other => panic!("expected buffer, got {:?}", other),
        },
        other => panic!("expected pointer, got {:?}", other),
    }
    match &open.args[1] {
        Type::Flags(f) => {
            assert_eq!(f.values, vec![0, 1, 2, 64, 512, 1024]);
            assert_eq!(f.int.size, 8);
        }
        other => panic!("expected flags, got {:?}", other),
    }

    let mount = prog.syscall("mount").unwrap();
    assert!(mount.args[1].is_optional());
    match &mount.args[0] {
        Type::Ptr(p) => match p.elem.as_ref() {
            Type::Buffer(b) => assert_eq!(b.values, vec!["ext4", "tmpfs", "proc"]),
            other => panic!("expected buffer, got {:?}", other),
        },
        other => panic!("expected pointer, got {:?}", other),
    }

    let read = prog.syscall("read").unwrap();
    match &read.args[2] {
        Type::Len(l) => {
            assert_eq!(l.buf, "buf");
            assert_eq!(l.byte_size, Some(1));
            assert_eq!(l.int.size, 8);
        }
        other => panic!("expected len, got {:?}", other),
    }
    match &read.args[1] {
        Type::Ptr(p) => match p.elem.as_ref() {
            Type::Array(a) => assert_eq!(a.len, None),
            other => panic!("expected array, got {:?}", other),
        },
        other => panic!("expected pointer, got {:?}", other),
    }

    let prio = &prog.syscall("setpriority").unwrap().args[2];
    match prio {
        Type::Int(i) => {
            assert_eq!(i.range, Some((0, 39)));
            assert_eq!(i.int.size, 4);
        }
        other => panic!("expected int, got {:?}", other),
    }

    let proc_call = prog.syscall("syz_test$proc").unwrap();
    assert_eq!(proc_call.nr, None);
    match &proc_call.args[0] {
        Type::Proc(p) => {
            assert_eq!(p.values_start, 20000);
            assert_eq!(p.values_per_proc, 4);
            assert_eq!(p.int.size, 2);
            assert!(p.int.big_endian);
        }
        other => panic!("expected proc, got {:?}", other),
    }
}

#[test]
fn test_sample_struct_keys() {
    let prog = compile(&sample(), &TargetConfig::default()).unwrap();
    let keys: Vec<_> = prog.structs.iter().map(|s| s.key.clone()).collect();
    assert_eq!(
        keys,
        vec![
            StructKey::new("ifconf", Dir::InOut),
            StructKey::new("ifr_ifru", Dir::In),
            StructKey::new("ifr_ifru", Dir::Out),
            StructKey::new("ifreq", Dir::In),
            StructKey::new("ifreq", Dir::Out),
            StructKey::new("mount_opts", Dir::In),
        ]
    );
}

#[test]
fn test_sample_bitfields() {
    let prog = compile(&sample(), &TargetConfig::default()).unwrap();
    let opts = prog.struct_fields("mount_opts", Dir::In).unwrap();
    let layout: Vec<_> = opts
        .fields
        .iter()
        .map(|f| (f.bitfield_offset(), f.is_bitfield_last()))
        .collect();
    assert_eq!(
        layout,
        vec![(0, false), (1, false), (2, true), (0, true), (0, false)]
    );

    let ifreq = prog.struct_fields("ifreq", Dir::Out).unwrap();
    match &ifreq.fields[0] {
        Type::Array(a) => {
            assert_eq!(a.len, Some(16));
            assert_eq!(a.elem.size(), 1);
        }
        other => panic!("expected array, got {:?}", other),
    }

    let union = prog.struct_fields("ifr_ifru", Dir::Out).unwrap();
    assert!(union.fields.iter().all(|f| !f.is_bitfield_last()));
}

#[test]
fn test_32bit_target_sizes() {
    let target = TargetConfig::from_str("arch = \"386\"\nptr_size = 4").unwrap();
    let prog = compile(&sample(), &target).unwrap();
    let open = prog.syscall("open").unwrap();
    assert_eq!(open.args[0].size(), 4);
    assert_eq!(open.args[1].size(), 4);
}

// ────────────────────────────────────────────────────────────────────────────
// Determinism
// ────────────────────────────────────────────────────────────────────────────

#[test]
fn test_shuffled_declarations_give_same_prog() {
    let desc = sample();
    let expected = compile(&desc, &TargetConfig::default()).unwrap();

    let mut rng = StdRng::seed_from_u64(0x5eed);
    for _ in 0..16 {
        let mut shuffled = desc.clone();
        shuffled.nodes.shuffle(&mut rng);
        let prog = compile(&shuffled, &TargetConfig::default()).unwrap();
        assert_eq!(prog, expected);
    }
}

#[test]
fn test_repeated_compile_identical() {
    let desc = sample();
    let first = compile(&desc, &TargetConfig::default()).unwrap();
    let second = compile(&desc, &TargetConfig::default()).unwrap();
    assert_eq!(first, second);
}

// ────────────────────────────────────────────────────────────────────────────
// Custom registries
// ────────────────────────────────────────────────────────────────────────────

/// Delegates to the builtin registry and records every resolution request
struct RecordingRegistry {
    inner: BuiltinRegistry,
    calls: RefCell<Vec<(String, String, Dir, bool)>>,
}

impl TypeRegistry for RecordingRegistry {
    fn resolve<'r, 't>(
        &'r self,
        ty: &'t TypeRef,
        field: &str,
        dir: Dir,
        is_arg: bool,
    ) -> LowerResult<Resolution<'r, 't>> {
        self.calls
            .borrow_mut()
            .push((ty.ident.clone(), field.to_string(), dir, is_arg));
        self.inner.resolve(ty, field, dir, is_arg)
    }
}

#[test]
fn test_registry_inputs() {
    let json = r#"{ "nodes": [
        { "kind": "resource", "name": "fd", "base": "int32" },
        { "kind": "call", "name": "dup", "call_name": "dup", "ret": "fd",
          "args": [ { "name": "old", "type": { "ident": "ptr", "args": ["out", "s"] } } ] },
        { "kind": "struct", "name": "s", "fields": [ { "name": "v", "type": "int8" } ] }
    ] }"#;
    let desc = Description::from_json_str(json).unwrap();
    let registry = RecordingRegistry {
        inner: BuiltinRegistry::new(&TargetConfig::default()),
        calls: RefCell::new(Vec::new()),
    };
    compile_with(&desc, &registry).unwrap();

    let calls = registry.calls.into_inner();
    let call = |ident: &str, field: &str, dir, is_arg| {
        (ident.to_string(), field.to_string(), dir, is_arg)
    };
    assert_eq!(
        calls,
        vec![
            // Resource pass
            call("int32", "", Dir::In, false),
            // Syscall pass: return value first, then arguments
            call("fd", "ret", Dir::Out, true),
            call("int32", "", Dir::Out, false),
            call("ptr", "old", Dir::In, true),
            call("s", "", Dir::Out, false),
            // Struct pass
            call("int8", "v", Dir::Out, false),
        ]
    );
}

/// Reports a struct usage for a struct nobody declared
struct GhostDesc;

impl TypeDesc for GhostDesc {
    fn name(&self) -> &'static str {
        "ghost"
    }

    fn instantiate(
        &self,
        lower: &mut Lowerer<'_>,
        _ty: &TypeRef,
        _args: &[TypeRef],
        base: IntTypeCommon,
    ) -> LowerResult<Type> {
        lower.note_struct_use(StructKey::new("ghost", base.common.dir));
        Ok(Type::Int(sysdesc_compiler::ir::IntType {
            int: base,
            range: None,
        }))
    }
}

struct GhostRegistry {
    inner: BuiltinRegistry,
}

impl TypeRegistry for GhostRegistry {
    fn resolve<'r, 't>(
        &'r self,
        ty: &'t TypeRef,
        field: &str,
        dir: Dir,
        is_arg: bool,
    ) -> LowerResult<Resolution<'r, 't>> {
        let mut res = self.inner.resolve(ty, field, dir, is_arg)?;
        if ty.ident == "int64" {
            res.desc = &GhostDesc;
        }
        Ok(res)
    }
}

#[test]
fn test_undeclared_struct_use_aborts() {
    let json = r#"{ "nodes": [
        { "kind": "call", "name": "f", "call_name": "f",
          "args": [ { "name": "a", "type": "int64" } ] }
    ] }"#;
    let desc = Description::from_json_str(json).unwrap();
    let registry = GhostRegistry {
        inner: BuiltinRegistry::new(&TargetConfig::default()),
    };
    let err = compile_with(&desc, &registry).unwrap_err();
    assert_eq!(
        err,
        LowerError::UnknownStruct {
            name: "ghost".to_string()
        }
    );
}

#[test]
fn test_unknown_type_aborts() {
    let json = r#"{ "nodes": [
        { "kind": "call", "name": "f", "call_name": "f",
          "args": [ { "name": "a", "type": "no_such_type" } ] }
    ] }"#;
    let desc = Description::from_json_str(json).unwrap();
    let err = compile(&desc, &TargetConfig::default()).unwrap_err();
    assert_eq!(
        err,
        LowerError::UnknownType {
            name: "no_such_type".to_string()
        }
    );
}
