use std::io::Read;

use crate::error::Result;

const STREAM_PREALLOC_LIMIT: u64 = 1 << 20;

/// Payload of an asset as handed out by a locator.
pub enum ResourceData {
    Static(ResourceDataStatic),
    Stream(ResourceDataStream),
}

impl ResourceData {
    pub fn path(&self) -> &str {
        match self {
            ResourceData::Static(data) => data.path(),
            ResourceData::Stream(data) => data.path(),
        }
    }

    pub fn is_stream(&self) -> bool {
        matches!(self, ResourceData::Stream(_))
    }

    /// Materializes the whole payload, draining the stream if needed.
    pub fn into_bytes(self) -> Result<Vec<u8>> {
        match self {
            ResourceData::Static(data) => Ok(data.into_bytes()),
            ResourceData::Stream(mut data) => {
                // the recorded size is not trusted for allocation; the stream checks it at EOF
                let mut buf = Vec::with_capacity(data.size().min(STREAM_PREALLOC_LIMIT) as usize);
                data.read_to_end(&mut buf)?;
                Ok(buf)
            }
        }
    }
}

/// Fully materialized payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceDataStatic {
    path: String,
    data: Vec<u8>,
}

impl ResourceDataStatic {
    pub fn new(path: impl Into<String>, data: Vec<u8>) -> Self {
        Self { path: path.into(), data }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Payload read incrementally from its backing store.
pub struct ResourceDataStream {
    path: String,
    size: u64,
    reader: Box<dyn Read + Send>,
}

impl ResourceDataStream {
    pub fn new(path: impl Into<String>, size: u64, reader: Box<dyn Read + Send>) -> Self {
        Self {
            path: path.into(),
            size,
            reader,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Decoded size of the payload.
    pub fn size(&self) -> u64 {
        self.size
    }
}

impl Read for ResourceDataStream {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.reader.read(buf)
    }
}

impl std::fmt::Debug for ResourceData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceData::Static(data) => f
                .debug_struct("Static")
                .field("path", &data.path)
                .field("len", &data.data.len())
                .finish(),
            ResourceData::Stream(data) => f
                .debug_struct("Stream")
                .field("path", &data.path)
                .field("size", &data.size)
                .finish(),
        }
    }
}
