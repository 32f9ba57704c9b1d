//! Demonstrates class-loading policies and bridged exceptions.
//!
//! Run with: cargo run --example restricted_loader

use std::sync::Arc;

use jvm_bridge_rs::prelude::*;

fn main() -> Result<()> {
    // A policy that forbids the serialization marker interface
    let restricted = Arc::new(RestrictedClassLoader::forbidding(["java.io.Serializable"]));

    println!("=== Restricted handle ===");
    let mut vm = Interpreter::with_defaults()?;
    vm.set_interactive(true)?;
    vm.set_class_loader(restricted)?;

    // The import is lazy about interfaces, so this succeeds
    vm.eval("from java.io import File")?;
    println!("import succeeded");

    // Construction resolves the required interfaces through the policy
    match vm.eval("f = File(\"failed.txt\")") {
        Err(e) => println!("construction rejected: {}", e),
        Ok(_) => println!("unexpectedly constructed"),
    }
    vm.close()?;

    println!("\n=== Unrestricted handle ===");
    let mut vm = Interpreter::with_defaults()?;
    vm.set_interactive(true)?;
    vm.eval("from java.io import File")?;
    vm.eval("f = File(\"failed.txt\")")?;
    println!("constructed: {}", vm.get_value("f")?);
    vm.close()?;

    // The same fixture the managed side exposes works too
    println!("\n=== Policy from a class static ===");
    let test = find_class("jep.Test")?;
    let loader = test
        .get_static("restrictedClassLoader")?
        .as_loader()
        .expect("static is a classloader");
    let mut vm = Interpreter::with_defaults()?;
    vm.set_class_loader(loader)?;
    vm.eval("from java.io import File")?;
    match vm.eval("f = File(\"failed.txt\")") {
        Err(e) => println!("rejected again: {}", e),
        Ok(_) => println!("unexpectedly constructed"),
    }
    vm.close()?;

    Ok(())
}
