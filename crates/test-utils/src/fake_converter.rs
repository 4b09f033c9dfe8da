use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use kaiba_batch::errors::Result;
use kaiba_batch::exec::SeriesConverter;
use kaiba_batch::fs::FileSystem;

/// A fake DICOM-to-NIfTI converter.
///
/// Records `(series, output)` pairs. Writes a dummy volume to `output` and
/// reports success, unless the series file name is listed in `failing`.
pub struct FakeConverter {
    fs: Arc<dyn FileSystem>,
    calls: Arc<Mutex<Vec<(PathBuf, PathBuf)>>>,
    failing: Vec<String>,
}

impl FakeConverter {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self {
            fs,
            calls: Arc::new(Mutex::new(Vec::new())),
            failing: Vec::new(),
        }
    }

    pub fn failing_on(mut self, name: &str) -> Self {
        self.failing.push(name.to_string());
        self
    }

    pub fn calls(&self) -> Arc<Mutex<Vec<(PathBuf, PathBuf)>>> {
        Arc::clone(&self.calls)
    }
}

impl SeriesConverter for FakeConverter {
    fn convert<'a>(
        &'a mut self,
        series: &'a Path,
        output: &'a Path,
    ) -> Pin<Box<dyn Future<Output = Result<bool>> + Send + 'a>> {
        Box::pin(async move {
            self.calls
                .lock()
                .unwrap()
                .push((series.to_path_buf(), output.to_path_buf()));

            let name = series
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            if self.failing.contains(&name) {
                return Ok(false);
            }

            self.fs.write(output, b"converted volume")?;
            Ok(true)
        })
    }
}

/// Converter for runs that never expect a conversion.
pub struct NoConverter;

impl SeriesConverter for NoConverter {
    fn convert<'a>(
        &'a mut self,
        series: &'a Path,
        _output: &'a Path,
    ) -> Pin<Box<dyn Future<Output = Result<bool>> + Send + 'a>> {
        panic!("unexpected conversion of {:?}", series)
    }
}
