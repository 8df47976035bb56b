//! Generate static files

use anyhow::Result;

use crate::generator::Generator;
use crate::Site;

/// Load the data and render the whole site into the public directory
pub fn run(site: &Site) -> Result<()> {
    let start = std::time::Instant::now();

    let context = site.clone().load_context();
    let generator = Generator::new()?;
    generator.generate(&context)?;

    let duration = start.elapsed();
    tracing::info!("Generated in {:.2}s", duration.as_secs_f64());

    Ok(())
}
