//! Dashboard compositor
//!
//! Lays registered elements out on a grid and renders all of them once
//! per pass. The dashboard owns the console, so it is the only writer.

use tessera_core::{GridGeometry, Registry, RegistryError};
use tessera_protocol::vt100;

use crate::console::{Console, ConsoleError};
use crate::element::Element;
use crate::window::Window;

/// Most elements a dashboard holds
pub const MAX_ELEMENTS: usize = 9;

/// Summary of one rendering pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PassReport {
    /// Windows built and handed to an element
    pub rendered: u8,
    /// Windows whose console writes failed
    pub faulted: u8,
    /// First window fault of the pass
    pub first_fault: Option<ConsoleError>,
    /// Flush failure at the end of the pass
    pub flush_error: Option<ConsoleError>,
}

impl PassReport {
    /// Check if every write of the pass succeeded
    pub fn is_clean(&self) -> bool {
        self.faulted == 0 && self.flush_error.is_none()
    }
}

/// Grid compositor over a console
pub struct Dashboard<'a, C: Console> {
    console: C,
    grid: GridGeometry,
    elements: Registry<'a, dyn Element + 'a, MAX_ELEMENTS>,
}

impl<'a, C: Console> Dashboard<'a, C> {
    /// Create a dashboard rendering into `console`
    ///
    /// Capacity is the smaller of [`MAX_ELEMENTS`] and the number of grid
    /// cells, so no two elements ever share a window.
    pub fn new(console: C, grid: GridGeometry) -> Self {
        Self {
            console,
            grid,
            elements: Registry::with_limit(grid.cells()),
        }
    }

    /// Register an element and return its slot index
    ///
    /// The slot decides the element's grid cell for the life of the
    /// dashboard.
    pub fn register(&mut self, element: &'a (dyn Element + 'a)) -> Result<usize, RegistryError> {
        self.elements.register(element)
    }

    /// Render every registered element once, in registration order
    ///
    /// A window whose writes fail is counted and the pass moves on. The
    /// console is flushed once at the end.
    pub fn pass(&mut self) -> PassReport {
        let mut report = PassReport::default();

        for (index, element) in self.elements.iter() {
            let Some(origin) = self.grid.origin(index) else {
                // Capacity is clamped to the grid
                continue;
            };

            let mut window = Window::new(&mut self.console, origin);
            window.setup();
            element.display(&mut window);

            report.rendered = report.rendered.saturating_add(1);
            if let Some(fault) = window.fault() {
                report.faulted = report.faulted.saturating_add(1);
                report.first_fault.get_or_insert(fault);
            }
        }

        report.flush_error = self.console.flush().err();
        report
    }

    /// Erase the whole terminal
    pub fn clear(&mut self) -> Result<(), ConsoleError> {
        self.console.write_bytes(vt100::erase_display().as_bytes())?;
        self.console.flush()
    }

    /// Number of registered elements
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Check if nothing is registered
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Most elements this dashboard accepts
    pub fn capacity(&self) -> usize {
        self.elements.capacity()
    }

    /// Grid layout
    pub fn grid(&self) -> &GridGeometry {
        &self.grid
    }

    /// Borrow the console
    pub fn console(&self) -> &C {
        &self.console
    }

    /// Release the console
    pub fn into_console(self) -> C {
        self.console
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::{Cell, RefCell};
    use tessera_core::Origin;

    type Recording = heapless::Vec<u8, 1024>;

    /// Element that records each origin it was displayed at
    struct Probe<'l> {
        label: &'static str,
        log: &'l RefCell<std::vec::Vec<(&'static str, Origin)>>,
    }

    impl Element for Probe<'_> {
        fn display(&self, window: &mut Window<'_>) {
            self.log.borrow_mut().push((self.label, window.origin()));
            window.print(format_args!("{}", self.label));
        }
    }

    struct Counting {
        calls: Cell<u32>,
    }

    impl Element for Counting {
        fn display(&self, _window: &mut Window<'_>) {
            self.calls.set(self.calls.get() + 1);
        }
    }

    fn grid(columns: u16, rows: u16, width: u16, height: u16) -> GridGeometry {
        GridGeometry::new(columns, rows, width, height).unwrap()
    }

    #[test]
    fn test_empty_pass() {
        let mut dashboard: Dashboard<'_, Recording> = Dashboard::new(Recording::new(), grid(3, 3, 20, 8));
        let report = dashboard.pass();
        assert_eq!(report.rendered, 0);
        assert!(report.is_clean());
        assert!(dashboard.console().is_empty());
    }

    #[test]
    fn test_three_entrants_in_order() {
        let log = RefCell::new(std::vec::Vec::new());
        let a = Probe { label: "a", log: &log };
        let b = Probe { label: "b", log: &log };
        let c = Probe { label: "c", log: &log };

        let mut dashboard = Dashboard::new(Recording::new(), grid(3, 3, 20, 5));
        assert_eq!(dashboard.register(&a), Ok(0));
        assert_eq!(dashboard.register(&b), Ok(1));
        assert_eq!(dashboard.register(&c), Ok(2));

        let report = dashboard.pass();
        assert_eq!(report.rendered, 3);
        assert_eq!(
            *log.borrow(),
            vec![
                ("a", Origin { column: 0, row: 0 }),
                ("b", Origin { column: 20, row: 0 }),
                ("c", Origin { column: 40, row: 0 }),
            ]
        );
        assert_eq!(
            dashboard.console().as_slice(),
            b"\x1b[2;1Ha\x1b[2;21Hb\x1b[2;41Hc"
        );
    }

    #[test]
    fn test_each_element_rendered_once_per_pass() {
        let counter = Counting { calls: Cell::new(0) };
        let mut dashboard = Dashboard::new(Recording::new(), grid(3, 3, 20, 8));
        dashboard.register(&counter).unwrap();

        dashboard.pass();
        dashboard.pass();
        assert_eq!(counter.calls.get(), 2);
    }

    #[test]
    fn test_capacity_clamped_to_grid() {
        let elements: std::vec::Vec<Counting> = (0..5).map(|_| Counting { calls: Cell::new(0) }).collect();
        let mut dashboard = Dashboard::new(Recording::new(), grid(2, 2, 10, 4));
        assert_eq!(dashboard.capacity(), 4);
        for (i, element) in elements.iter().take(4).enumerate() {
            assert_eq!(dashboard.register(element), Ok(i));
        }
        assert_eq!(dashboard.register(&elements[4]), Err(RegistryError::Full));
    }

    #[test]
    fn test_capacity_never_above_nine() {
        let dashboard: Dashboard<'_, Recording> = Dashboard::new(Recording::new(), grid(4, 4, 10, 4));
        assert_eq!(dashboard.capacity(), MAX_ELEMENTS);
    }

    #[test]
    fn test_duplicate_rejected() {
        let counter = Counting { calls: Cell::new(0) };
        let mut dashboard = Dashboard::new(Recording::new(), grid(3, 3, 20, 8));
        dashboard.register(&counter).unwrap();
        assert_eq!(dashboard.register(&counter), Err(RegistryError::AlreadyRegistered));
    }

    #[test]
    fn test_fault_does_not_halt_pass() {
        let log = RefCell::new(std::vec::Vec::new());
        let a = Probe { label: "aaaaaaaaaaaa", log: &log };
        let b = Probe { label: "b", log: &log };

        // Room for the first setup sequence and little else
        let console: heapless::Vec<u8, 10> = heapless::Vec::new();
        let mut dashboard = Dashboard::new(console, grid(3, 3, 20, 8));
        dashboard.register(&a).unwrap();
        dashboard.register(&b).unwrap();

        let report = dashboard.pass();
        assert_eq!(report.rendered, 2);
        assert_eq!(report.faulted, 2);
        assert_eq!(report.first_fault, Some(ConsoleError::Overflow));
        assert_eq!(log.borrow().len(), 2);
    }

    #[test]
    fn test_clear() {
        let mut dashboard: Dashboard<'_, Recording> = Dashboard::new(Recording::new(), grid(3, 3, 20, 8));
        dashboard.clear().unwrap();
        assert_eq!(dashboard.console().as_slice(), b"\x1b[2J");
    }
}
