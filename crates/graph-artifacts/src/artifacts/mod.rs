use log::debug;
use serde::Serialize;
use std::io::Write;

mod rendered_graph;

pub use rendered_graph::*;

pub trait ArtifactExt
where
    Self: Sized + Serialize,
{
    /// WARNING: This doesn't support generic types
    fn name() -> &'static str {
        let full_name = std::any::type_name::<Self>();
        full_name.rsplit("::").next().unwrap_or(full_name)
    }

    fn encode_to_writer<W: std::io::Write>(&self, mut writer: W) -> anyhow::Result<()> {
        let encoded = rmp_serde::to_vec_named(self)?;
        writer.write_all(&encoded)?;
        Ok(())
    }

    fn encode_json_to_writer<W: std::io::Write>(&self, writer: W) -> anyhow::Result<()> {
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    fn save_file_to<P: AsRef<std::path::Path>>(
        &self,
        folder: P,
        filename: &str,
    ) -> anyhow::Result<()> {
        std::fs::create_dir_all(folder.as_ref())?;
        let file = std::fs::File::create(folder.as_ref().join(filename))?;
        self.encode_to_writer(file)?;

        debug!("Saved {} artifact to {:?}", Self::name(), folder.as_ref());
        Ok(())
    }

    fn save_to<P: AsRef<std::path::Path>>(&self, folder: P) -> anyhow::Result<()> {
        self.save_file_to(folder, &format!("{}.msgpack", Self::name()))
    }

    fn save_json_to<P: AsRef<std::path::Path>>(&self, folder: P) -> anyhow::Result<()> {
        std::fs::create_dir_all(folder.as_ref())?;
        let filename = format!("{}.json", Self::name());
        let file = std::fs::File::create(folder.as_ref().join(&filename))?;
        let mut writer = std::io::BufWriter::new(file);
        self.encode_json_to_writer(&mut writer)?;
        writer.flush()?;

        debug!("Saved {} artifact to {:?}", filename, folder.as_ref());
        Ok(())
    }
}
