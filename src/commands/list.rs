//! List commands implementation

/// List all backends compiled into this build
pub fn list_backends() {
    let backends = spihal_bus::available_backends();
    let default = spihal_bus::info().name;

    println!("Available backends:");
    println!();
    for backend in &backends {
        let marker = if backend.name == default { " (default)" } else { "" };
        println!("  {:<10} - {}{}", backend.name, backend.description, marker);
        if !backend.aliases.is_empty() {
            println!("  {:<10}   aliases: {}", "", backend.aliases.join(", "));
        }
    }
}
