//! `sysdesc check`: lower without printing the IR

use std::path::Path;

pub fn execute(file: &Path, target: Option<&Path>) -> anyhow::Result<()> {
    let (desc, target) = super::load_inputs(file, target)?;
    let prog = sysdesc_compiler::compile(&desc, &target)?;
    println!(
        "{}: ok ({} resources, {} syscalls, {} struct usages)",
        file.display(),
        prog.resources.len(),
        prog.syscalls.len(),
        prog.structs.len()
    );
    Ok(())
}
