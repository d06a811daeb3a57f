// Portable COM-style object model: interface identities, explicit reference
// counting and capability negotiation. The Windows adapters wrap these objects,
// other hosts use them directly.
use std::marker::PhantomData;
use std::ops::Deref;
use std::ptr::NonNull;
use std::sync::atomic::{AtomicU32, Ordering, fence};

use uuid::Uuid;

use crate::error::{Result, ShellExError};

pub type Guid = Uuid;

/// `IUnknown`, the base identity every object answers to.
pub const IID_IUNKNOWN: Guid = Uuid::from_u128(0x00000000_0000_0000_c000_000000000046);
/// `IClassFactory`
pub const IID_ICLASS_FACTORY: Guid = Uuid::from_u128(0x00000001_0000_0000_c000_000000000046);
/// `IExplorerCommand`
pub const IID_IEXPLORER_COMMAND: Guid = Uuid::from_u128(0xa08ce4d0_fa25_44ab_b57c_c7b1c323e0b9);

static LIVE_OBJECTS: AtomicU32 = AtomicU32::new(0);

/// Keeps the module loaded while held. Every factory and command object owns one.
#[derive(Debug)]
pub struct ModuleRef(());

impl ModuleRef {
    pub fn new() -> Self {
        LIVE_OBJECTS.fetch_add(1, Ordering::SeqCst);
        Self(())
    }
}

impl Default for ModuleRef {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ModuleRef {
    fn drop(&mut self) {
        LIVE_OBJECTS.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Whether no object created by this module is still alive.
pub fn can_unload_now() -> bool {
    LIVE_OBJECTS.load(Ordering::SeqCst) == 0
}

/// Capability negotiation. `IID_IUNKNOWN` is always supported and is not listed.
pub trait Unknown: Send + Sync {
    fn interfaces(&self) -> &'static [Guid];

    fn supports(&self, iid: &Guid) -> bool {
        *iid == IID_IUNKNOWN || self.interfaces().contains(iid)
    }
}

struct ComInner<T> {
    refs: AtomicU32,
    value: T,
}

/// Atomically reference-counted object handle.
///
/// A handle owns one reference: cloning is `AddRef`, dropping is `Release`.
/// [`ComPtr::add_ref`] and [`ComPtr::release`] expose the raw counter for
/// callers that track references themselves, as a host does across the ABI.
/// The value is dropped exactly once, when the count reaches zero.
pub struct ComPtr<T> {
    ptr: NonNull<ComInner<T>>,
    _marker: PhantomData<ComInner<T>>,
}

unsafe impl<T: Send + Sync> Send for ComPtr<T> {}
unsafe impl<T: Send + Sync> Sync for ComPtr<T> {}

impl<T> ComPtr<T> {
    pub fn new(value: T) -> Self {
        let inner = Box::new(ComInner {
            refs: AtomicU32::new(1),
            value,
        });
        Self {
            ptr: NonNull::from(Box::leak(inner)),
            _marker: PhantomData,
        }
    }

    fn inner(&self) -> &ComInner<T> {
        // The handle's own reference keeps the allocation alive.
        unsafe { self.ptr.as_ref() }
    }

    /// Increments the reference count and returns the new count.
    pub fn add_ref(&self) -> u32 {
        self.inner().refs.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Decrements the reference count and returns the new count.
    ///
    /// # Safety
    ///
    /// Each call must balance an earlier [`ComPtr::add_ref`]. The reference
    /// owned by the handle itself is released by `Drop`, never by this method.
    pub unsafe fn release(&self) -> u32 {
        unsafe { Self::release_raw(self.ptr) }
    }

    unsafe fn release_raw(ptr: NonNull<ComInner<T>>) -> u32 {
        let previous = unsafe { ptr.as_ref() }.refs.fetch_sub(1, Ordering::Release);
        if previous == 1 {
            fence(Ordering::Acquire);
            drop(unsafe { Box::from_raw(ptr.as_ptr()) });
        }
        previous - 1
    }

    /// Current reference count. Only meaningful for diagnostics and tests.
    pub fn ref_count(&self) -> u32 {
        self.inner().refs.load(Ordering::Acquire)
    }
}

impl<T: Unknown> ComPtr<T> {
    /// `QueryInterface`: a new counted handle when `iid` is supported.
    pub fn query(&self, iid: &Guid) -> Result<ComPtr<T>> {
        if self.supports(iid) {
            Ok(self.clone())
        } else {
            Err(ShellExError::NoInterface)
        }
    }
}

impl<T> Clone for ComPtr<T> {
    fn clone(&self) -> Self {
        self.add_ref();
        Self {
            ptr: self.ptr,
            _marker: PhantomData,
        }
    }
}

impl<T> Drop for ComPtr<T> {
    fn drop(&mut self) {
        unsafe {
            Self::release_raw(self.ptr);
        }
    }
}

impl<T> Deref for ComPtr<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.inner().value
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for ComPtr<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComPtr")
            .field("refs", &self.ref_count())
            .field("value", &**self)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::AtomicUsize;

    #[derive(Debug)]
    struct Tracked {
        drops: Arc<AtomicUsize>,
    }

    impl Drop for Tracked {
        fn drop(&mut self) {
            self.drops.fetch_add(1, Ordering::SeqCst);
        }
    }

    impl Unknown for Tracked {
        fn interfaces(&self) -> &'static [Guid] {
            &[IID_IEXPLORER_COMMAND]
        }
    }

    fn tracked() -> (ComPtr<Tracked>, Arc<AtomicUsize>) {
        let drops = Arc::new(AtomicUsize::new(0));
        let ptr = ComPtr::new(Tracked {
            drops: drops.clone(),
        });
        (ptr, drops)
    }

    #[test]
    fn test_add_ref_release_counts() {
        let (ptr, drops) = tracked();
        assert_eq!(ptr.ref_count(), 1);
        assert_eq!(ptr.add_ref(), 2);
        assert_eq!(ptr.add_ref(), 3);
        assert_eq!(unsafe { ptr.release() }, 2);
        assert_eq!(unsafe { ptr.release() }, 1);
        assert_eq!(drops.load(Ordering::SeqCst), 0);

        drop(ptr);
        assert_eq!(drops.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_destroyed_once_on_last_handle() {
        let (ptr, drops) = tracked();
        let second = ptr.clone();
        assert_eq!(ptr.ref_count(), 2);

        drop(ptr);
        assert_eq!(drops.load(Ordering::SeqCst), 0);
        assert_eq!(second.ref_count(), 1);

        drop(second);
        assert_eq!(drops.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_query_supported_and_base_identity() {
        let (ptr, _drops) = tracked();

        let command = ptr.query(&IID_IEXPLORER_COMMAND).unwrap();
        assert_eq!(ptr.ref_count(), 2);
        let unknown = ptr.query(&IID_IUNKNOWN).unwrap();
        assert_eq!(ptr.ref_count(), 3);

        drop(command);
        drop(unknown);
        assert_eq!(ptr.ref_count(), 1);
    }

    #[test]
    fn test_query_unsupported_leaves_count() {
        let (ptr, drops) = tracked();
        let result = ptr.query(&IID_ICLASS_FACTORY);
        assert_eq!(result.unwrap_err(), ShellExError::NoInterface);
        assert_eq!(ptr.ref_count(), 1);
        drop(ptr);
        assert_eq!(drops.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_concurrent_add_ref_release() {
        let (ptr, drops) = tracked();
        let threads: Vec<_> = (0..8)
            .map(|_| {
                let handle = ptr.clone();
                std::thread::spawn(move || {
                    for _ in 0..1000 {
                        handle.add_ref();
                        unsafe {
                            handle.release();
                        }
                        let copy = handle.clone();
                        drop(copy);
                    }
                })
            })
            .collect();
        for thread in threads {
            thread.join().unwrap();
        }

        assert_eq!(ptr.ref_count(), 1);
        drop(ptr);
        assert_eq!(drops.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_module_ref_blocks_unload() {
        let guard = ModuleRef::new();
        assert!(!can_unload_now());
        drop(guard);
    }
}
