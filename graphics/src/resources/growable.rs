//! Growable staging buffer mirrored into a device buffer.
//!
//! A [`GrowableBuffer`] streams fixed-stride records to the GPU. Records are
//! appended into host-visible staging memory, which grows geometrically, and
//! copied into a device-resident buffer once per frame by [`GrowableBuffer::upload`].
//!
//! # Frame cycle
//!
//! ```ignore
//! // Each frame
//! for transform in visible {
//!     if let Err(e) = instances.append(transform) {
//!         log::warn!("instance dropped: {e}");
//!     }
//! }
//! let mut pass = device.begin_copy_pass();
//! instances.upload(&mut pass)?;
//! pass.submit()?;
//! // Bind instances.device_buffer() and draw instances.size() instances
//! ```
//!
//! The first `append` after an upload starts a new frame: it remaps the
//! staging memory and resets the element count. Capacity is kept, so frames
//! with a stable or shrinking count do not reallocate.

use std::marker::PhantomData;
use std::sync::Arc;

use bytemuck::Pod;

use crate::device::GraphicsDevice;
use crate::error::GraphicsError;
use crate::resources::{Buffer, StagingBuffer};
use crate::transfer::{BufferCopyRegion, CopyPass};
use crate::types::{BufferDescriptor, BufferUsage};

/// A host-visible buffer of `T` records with a device-resident mirror.
///
/// # Capacity
///
/// Capacity starts at [`GrowableBuffer::INITIAL_CAPACITY`] on the first
/// append and doubles whenever the buffer is full. It never shrinks.
///
/// # Thread Safety
///
/// `GrowableBuffer` is NOT meant to be shared between threads while a frame
/// is being recorded. Appends and the upload for one buffer happen in order
/// on a single thread.
pub struct GrowableBuffer<T: Pod> {
    device: Arc<GraphicsDevice>,
    usage: BufferUsage,
    label: String,
    staging: Option<Arc<StagingBuffer>>,
    buffer: Option<Arc<Buffer>>,
    size: u32,
    capacity: u32,
    resize: bool,
    _marker: PhantomData<T>,
}

impl<T: Pod> GrowableBuffer<T> {
    /// Capacity allocated by the first append.
    pub const INITIAL_CAPACITY: u32 = 20;

    /// Capacity multiplier applied when the buffer is full.
    pub const GROWTH_FACTOR: u32 = 2;

    /// Bytes per element.
    pub const STRIDE: u64 = std::mem::size_of::<T>() as u64;

    /// Create an empty buffer. Nothing is allocated until the first append.
    ///
    /// `usage` describes how the device buffer is bound; `COPY_DST` is added
    /// automatically.
    pub fn new(device: &Arc<GraphicsDevice>, usage: BufferUsage, label: impl Into<String>) -> Self {
        Self {
            device: Arc::clone(device),
            usage: usage | BufferUsage::COPY_DST,
            label: label.into(),
            staging: None,
            buffer: None,
            size: 0,
            capacity: 0,
            resize: false,
            _marker: PhantomData,
        }
    }

    /// Debug label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Number of valid elements since the last upload.
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Number of elements the staging memory can hold.
    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Whether the device buffer must be recreated on the next upload.
    pub fn needs_resize(&self) -> bool {
        self.resize
    }

    /// Whether the staging memory is open for appends.
    pub fn is_mapped(&self) -> bool {
        self.staging.as_ref().is_some_and(|s| s.is_mapped())
    }

    /// The device buffer to bind for drawing, if one exists.
    pub fn device_buffer(&self) -> Option<&Arc<Buffer>> {
        self.buffer.as_ref()
    }

    /// Append one record.
    ///
    /// # Errors
    ///
    /// Returns an error if the staging memory cannot be mapped or grown. The
    /// record is dropped and the buffer keeps its previous contents.
    pub fn append(&mut self, value: T) -> Result<(), GraphicsError> {
        if !self.is_mapped() {
            if let Some(staging) = &self.staging {
                staging.map()?;
            }
            self.size = 0;
            self.resize = false;
        }

        if self.size == self.capacity {
            self.grow()?;
        }

        let staging = self.staging.as_ref().ok_or_else(|| {
            GraphicsError::Internal(format!("{}: no staging memory after grow", self.label))
        })?;
        staging.write(u64::from(self.size) * Self::STRIDE, bytemuck::bytes_of(&value))?;
        self.size += 1;
        Ok(())
    }

    fn grow(&mut self) -> Result<(), GraphicsError> {
        let new_capacity = if self.size > 0 {
            self.size.checked_mul(Self::GROWTH_FACTOR).ok_or_else(|| {
                GraphicsError::InvalidParameter(format!("{}: capacity overflow", self.label))
            })?
        } else {
            Self::INITIAL_CAPACITY
        };

        let staging = self.device.create_staging_buffer(
            u64::from(new_capacity) * Self::STRIDE,
            Some(&format!("{} (staging)", self.label)),
        )?;

        if let Some(old) = &self.staging
            && self.size > 0
        {
            let bytes = old.read(0, u64::from(self.size) * Self::STRIDE)?;
            staging.write(0, &bytes)?;
        }

        log::debug!(
            "GrowableBuffer '{}': capacity {} -> {}",
            self.label,
            self.capacity,
            new_capacity
        );

        self.staging = Some(staging);
        self.capacity = new_capacity;
        self.resize = true;
        Ok(())
    }

    /// End the append phase and record the copy into the device buffer.
    ///
    /// Does nothing when no records were appended since the previous upload.
    ///
    /// # Errors
    ///
    /// Returns an error if the device buffer cannot be created or the copy
    /// cannot be recorded. The buffer then has no device buffer until a
    /// later upload succeeds.
    pub fn upload(&mut self, pass: &mut CopyPass) -> Result<(), GraphicsError> {
        let staging = match &self.staging {
            Some(staging) if staging.is_mapped() => {
                staging.unmap();
                Arc::clone(staging)
            }
            _ => {
                self.size = 0;
                return Ok(());
            }
        };

        if self.size == 0 {
            return Ok(());
        }

        let required = u64::from(self.capacity) * Self::STRIDE;
        let recreate = self.resize || self.buffer.as_ref().is_none_or(|b| b.size() < required);
        if recreate {
            // Release the old buffer first; pending copies keep their own reference.
            self.buffer = None;
            let descriptor =
                BufferDescriptor::new(required, self.usage).with_label(self.label.clone());
            let buffer = self.device.create_buffer(&descriptor)?;
            log::debug!(
                "GrowableBuffer '{}': device buffer recreated ({} bytes)",
                self.label,
                required
            );
            self.buffer = Some(buffer);
            self.resize = false;
        }

        let buffer = self.buffer.as_ref().ok_or_else(|| {
            GraphicsError::Internal(format!("{}: missing device buffer", self.label))
        })?;
        pass.record_buffer_upload(
            &staging,
            buffer,
            BufferCopyRegion::whole(u64::from(self.size) * Self::STRIDE),
        )
    }

    /// Read back the records appended in the current frame.
    ///
    /// Only valid during the append phase.
    ///
    /// # Errors
    ///
    /// Returns [`GraphicsError::InvalidState`] once the buffer has been uploaded.
    pub fn read_staged(&self) -> Result<Vec<T>, GraphicsError> {
        match &self.staging {
            Some(staging) if self.size > 0 => {
                let bytes = staging.read(0, u64::from(self.size) * Self::STRIDE)?;
                Ok(bytemuck::pod_collect_to_vec(&bytes))
            }
            _ => Ok(Vec::new()),
        }
    }
}

impl<T: Pod> std::fmt::Debug for GrowableBuffer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GrowableBuffer")
            .field("label", &self.label)
            .field("size", &self.size)
            .field("capacity", &self.capacity)
            .field("resize", &self.resize)
            .field("mapped", &self.is_mapped())
            .finish()
    }
}
