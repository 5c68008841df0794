use anyhow::Result;

use abstutil::Timer;
use block_model::{assemble_blocks, Diagram, DiagramConfig, DiagramSpec};

use crate::{read_json, write_json};

pub fn run(
    input: String,
    cfg: DiagramConfig,
    fill_missing_radials: bool,
    output: String,
    json: Option<String>,
) -> Result<()> {
    let mut timer = Timer::new(format!("polygonize {}", input));

    timer.start("load diagram");
    let spec: DiagramSpec = read_json(&input)?;
    let mut diagram = Diagram::from_spec(&spec)?;
    timer.stop("load diagram");
    if fill_missing_radials {
        let added = diagram.fill_missing_radials(&cfg)?;
        if !added.is_empty() {
            timer.note(format!(
                "Generated {} straight radials: {}",
                added.len(),
                added.join(", ")
            ));
        }
    }

    let set = assemble_blocks(&diagram, &cfg, &mut timer)?;
    for (id, err) in &set.skipped {
        timer.warn(format!("{}: {}", id, err));
    }

    let collection = geojson::GeoJson::from(set.to_geojson());
    fs_err::write(&output, collection.to_string())?;
    info!("Wrote {} blocks to {}", set.blocks.len(), output);
    if let Some(path) = json {
        write_json(&path, &set)?;
    }
    Ok(())
}
