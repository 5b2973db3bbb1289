//! `sysdesc lower`: lower a description and summarize the IR

use std::path::Path;
use sysdesc_compiler::Prog;

pub fn execute(file: &Path, target: Option<&Path>, dump: bool) -> anyhow::Result<()> {
    let (desc, target) = super::load_inputs(file, target)?;
    let prog = sysdesc_compiler::compile(&desc, &target)?;
    if dump {
        println!("{:#?}", prog);
    } else {
        print_summary(&prog);
    }
    Ok(())
}

fn print_summary(prog: &Prog) {
    println!("resources: {}", prog.resources.len());
    for res in &prog.resources {
        println!(
            "  {} kind={} values={:?}",
            res.name,
            res.kind.join(">"),
            res.values
        );
    }

    println!("syscalls: {}", prog.syscalls.len());
    for call in &prog.syscalls {
        let nr = call.nr.map_or_else(|| "-".to_string(), |nr| nr.to_string());
        println!(
            "  {} ({}, nr {}) args={}{}",
            call.name,
            call.call_name,
            nr,
            call.args.len(),
            if call.ret.is_some() { " ret" } else { "" }
        );
    }

    println!("structs: {}", prog.structs.len());
    for s in &prog.structs {
        println!("  {} ({}) fields={}", s.key.name, s.key.dir, s.fields.len());
    }
}
