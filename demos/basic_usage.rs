//! Basic example of importing and constructing managed classes.
//!
//! Run with: cargo run --example basic_usage

use jvm_bridge_rs::prelude::*;

fn main() -> Result<()> {
    let mut vm = Interpreter::with_defaults()?;

    // Import a class and construct an instance
    println!("=== Import and construct ===");
    vm.eval("from java.io import File")?;
    vm.eval("f = File(\"notes.txt\")")?;
    let f = vm.get_value("f")?;
    println!("constructed: {}", f);

    // Dotted lookup through an imported package
    println!("\n=== Dotted lookup ===");
    vm.eval("import java.sql")?;
    let driver_manager = vm.get_value("java.sql.DriverManager")?;
    println!("resolved: {}", driver_manager);

    // Lazy attribute resolution on a module proxy
    println!("\n=== Module proxy ===");
    let importer = Importer::new();
    let lang = importer.load_module("java.lang")?;
    match lang.attr("Integer")? {
        ProxyAttr::Class(c) => println!("java.lang proxy resolved {}", c.name()),
        ProxyAttr::Package(p) => println!("unexpected package {}", p.path()),
    }
    match lang.attr("asdf") {
        Err(e) => println!("missing member: {}", e),
        Ok(_) => println!("unexpectedly resolved"),
    }

    vm.close()?;
    Ok(())
}
