//! Syscall lowering

use super::Lowerer;
use crate::ast::Call;
use crate::error::LowerResult;
use crate::ir::{Dir, Syscall};
use log::debug;

impl<'a> Lowerer<'a> {
    /// Lower every call, sorted by name
    pub(super) fn gen_syscalls(&mut self) -> LowerResult<Vec<Syscall>> {
        let desc = self.desc;
        let mut calls = desc
            .calls()
            .map(|call| self.gen_syscall(call))
            .collect::<LowerResult<Vec<_>>>()?;
        calls.sort_by(|a, b| a.name.cmp(&b.name));
        debug!(
            "generated {} syscalls, {} struct usages discovered",
            calls.len(),
            self.struct_uses.discovered()
        );
        Ok(calls)
    }

    pub(super) fn gen_syscall(&mut self, call: &Call) -> LowerResult<Syscall> {
        let ret = match &call.ret {
            Some(ret) => Some(self.gen_type(ret, "ret", Dir::Out, true)?),
            None => None,
        };
        Ok(Syscall {
            name: call.name.clone(),
            call_name: call.call_name.clone(),
            nr: call.nr,
            args: self.gen_field_array(&call.args, Dir::In, true)?,
            ret,
        })
    }
}
