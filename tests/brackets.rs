use approx::assert_relative_eq;
use brak::{
    parallel_for, Bracket, Layout, MDRangePolicy, MakeUnmanaged, View, WrapperArray,
    WrapperSubview,
};
use num_complex::Complex64;

fn init_test_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let _ = fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .with_test_writer()
        .try_init();
}

/// `w.at(i0).at(i1)...` for the given indices.
macro_rules! at_chain {
    ($w:expr; $($i:expr),+) => {
        $w $(.at($i))+
    };
}

/// Check that each bracket of `w.at(i0).at(i1)...` lowers the rank by one.
/// The last index is not applied, since it yields an element.
macro_rules! assert_prefix_ranks {
    ($w:expr, $rank:expr; $last:expr) => {};
    ($w:expr, $rank:expr; $head:expr, $($tail:expr),+) => {{
        let next = $w.at($head);
        assert_eq!(next.rank(), $rank - 1);
        assert_prefix_ranks!(next, $rank - 1; $($tail),+);
    }};
}

fn six_d_value([i, j, k, l, m, n]: [usize; 6]) -> i64 {
    (i + 2 * j + 3 * k + 4 * l + 5 * m + 6 * n) as i64
}

/// Compare bracket, direct and native access at every index of a view of the
/// given extents, for both the element address and its value, and check the
/// rank after every bracket.
macro_rules! rank_case {
    ($name:ident, $wrapper:ident, [$($e:expr),+], $($d:literal),+) => {
        #[test]
        fn $name() {
            let extents = [$($e),+];
            let data = View::from_fn("data", extents, |ix| {
                ix.iter().fold(0i64, |acc, &x| acc * 10 + x as i64)
            });
            let w = $wrapper::new(data.clone());
            assert_eq!(w.rank(), extents.len());
            let policy = MDRangePolicy::from_extents(extents);
            for linear in 0..policy.len() {
                let ix = policy.index_of(linear);
                assert_prefix_ranks!(w, extents.len(); $(ix[$d]),+);
                let native = data.element_ref(ix).as_ptr();
                let via_brackets = at_chain!(w; $(ix[$d]),+).as_ptr();
                let via_call = w.call(ix).as_ptr();
                assert_eq!(via_brackets, native);
                assert_eq!(via_call, native);
                assert_eq!(*at_chain!(w; $(ix[$d]),+), data[ix]);
            }
        }
    };
}

macro_rules! bracket_suite {
    ($suite:ident, $wrapper:ident) => {
        mod $suite {
            use super::*;

            #[test]
            fn test_create() {
                let data = View::<i32, 2>::new("data", [10, 10]);
                let w = $wrapper::new(data.clone());
                assert_eq!(w.view().extents(), &[10, 10]);
                assert_eq!(data.use_count(), 2);
            }

            #[test]
            fn test_access_rank_chain() {
                let data = View::<i32, 8>::new("data", [2; 8]);
                let w = $wrapper::new(data.clone());
                let element = at_chain!(w; 1, 0, 1, 0, 1, 0, 1, 0);
                // SAFETY: `element` is the only handle in use.
                unsafe { element.write(17) };
                assert_eq!(data[[1, 0, 1, 0, 1, 0, 1, 0]], 17);
                assert_eq!(*at_chain!(w; 1, 0, 1, 0, 1, 0, 1, 0), 17);
            }

            #[test]
            fn test_access_direct() {
                let data = View::<i32, 3>::new("data", [3, 3, 3]);
                let w = $wrapper::new(data.clone());
                // SAFETY: each write completes before the next access.
                unsafe {
                    w.call([2, 1, 0]).write(4);
                    w.at(2).call([1, 1]).write(5);
                    w.at(2).at(1).call([2]).write(6);
                }
                assert_eq!(data[[2, 1, 0]], 4);
                assert_eq!(data[[2, 1, 1]], 5);
                assert_eq!(data[[2, 1, 2]], 6);
                assert_eq!(w.at(2)[[1, 2]], 6);
            }

            #[test]
            fn test_write_1d() {
                let data = View::<usize, 1>::new("data", [10]);
                let w = $wrapper::new(data.clone());
                for i in 0..10 {
                    // SAFETY: single-threaded, one live handle.
                    unsafe { w.at(i).write(i) };
                }
                assert_eq!(data.to_vec(), (0..10).collect::<Vec<_>>());
            }

            #[test]
            fn test_defer_aliases_element() {
                let data = View::<i32, 2>::new("data", [10, 10]);
                let w = $wrapper::new(data.clone());
                assert_eq!(w.at(0).at(0).as_ptr(), data.as_mut_ptr());
                assert_eq!(w.at(3).at(7).as_ptr(), data.element_ref([3, 7]).as_ptr());
                assert_eq!(w.as_mut_ptr(), data.as_mut_ptr());
            }

            #[test]
            fn test_get_view() {
                let data = View::<i32, 2>::new("data", [10, 10]);
                let w = $wrapper::new(data.clone());
                let first = w.view();
                let second = w.view();
                assert_eq!(first.as_mut_ptr(), data.as_mut_ptr());
                assert_eq!(second.as_mut_ptr(), first.as_mut_ptr());
                assert_eq!(first.label(), "data");
            }

            #[test]
            fn test_brackets_keep_use_count() {
                let data = View::<f32, 4>::new("data", [2, 2, 2, 2]);
                let w = $wrapper::new(data.clone());
                assert_eq!(data.use_count(), 2);
                let deep = w.at(1).at(1).at(1);
                let copies = [deep; 16];
                for c in copies.iter() {
                    // SAFETY: the copies are used one after the other.
                    unsafe { *c.at(0).as_mut() += 1.0 };
                }
                assert_eq!(data.use_count(), 2);
                assert_eq!(data[[1, 1, 1, 0]], 16.0);
            }

            #[test]
            fn test_nested_for_6d() {
                let extents = [2, 3, 2, 3, 2, 3];
                let data = View::<i64, 6>::new("data", extents);
                let w = $wrapper::new(data.clone());
                for i in 0..extents[0] {
                    for j in 0..extents[1] {
                        for k in 0..extents[2] {
                            for l in 0..extents[3] {
                                for m in 0..extents[4] {
                                    for n in 0..extents[5] {
                                        let e = at_chain!(w; i, j, k, l, m, n);
                                        // SAFETY: single-threaded, one live handle.
                                        unsafe { e.write(six_d_value([i, j, k, l, m, n])) };
                                    }
                                }
                            }
                        }
                    }
                }
                assert_eq!(data[[0, 1, 0, 1, 0, 1]], 12);
                let expected = View::from_fn("expected", extents, six_d_value);
                assert_eq!(data.to_vec(), expected.to_vec());
            }

            #[test]
            fn test_parallel_for_6d() {
                init_test_logging();
                let extents = [2, 3, 2, 3, 2, 3];
                let data = View::<i64, 6>::new("data", extents);
                let w = $wrapper::new(data.clone());
                let policy = MDRangePolicy::from_extents(extents);
                parallel_for("fill_6d", &policy, move |ix: [usize; 6]| {
                    let [i, j, k, l, m, n] = ix;
                    // SAFETY: every index tuple writes its own element.
                    unsafe { at_chain!(w; i, j, k, l, m, n).write(six_d_value(ix)) };
                });
                assert_eq!(data[[0, 1, 0, 1, 0, 1]], 12);
                let expected = View::from_fn("expected", extents, six_d_value);
                assert_eq!(data.to_vec(), expected.to_vec());
                assert_eq!(data.use_count(), 1);
            }

            #[test]
            fn test_nested_for_6d_binary() {
                let extents = [2; 6];
                let data = View::<i64, 6>::new("data", extents);
                let w = $wrapper::new(data.clone());
                for i in 0..2 {
                    for j in 0..2 {
                        for k in 0..2 {
                            for l in 0..2 {
                                for m in 0..2 {
                                    for n in 0..2 {
                                        let e = at_chain!(w; i, j, k, l, m, n);
                                        // SAFETY: single-threaded, one live handle.
                                        unsafe { e.write(six_d_value([i, j, k, l, m, n])) };
                                    }
                                }
                            }
                        }
                    }
                }
                assert_eq!(data[[0, 1, 0, 1, 0, 1]], 12);
                assert_eq!(data[[1, 1, 1, 1, 1, 1]], 21);
                let expected = View::from_fn("expected", extents, six_d_value);
                assert_eq!(data.to_vec(), expected.to_vec());
            }

            #[test]
            fn test_parallel_for_6d_binary() {
                init_test_logging();
                let extents = [2; 6];
                let data = View::<i64, 6>::new("data", extents);
                let w = $wrapper::new(data.clone());
                let policy = MDRangePolicy::from_extents(extents);
                assert_eq!(policy.len(), 64);
                parallel_for("fill_6d_binary", &policy, move |ix: [usize; 6]| {
                    let [i, j, k, l, m, n] = ix;
                    // SAFETY: every index tuple writes its own element.
                    unsafe { at_chain!(w; i, j, k, l, m, n).write(six_d_value(ix)) };
                });
                assert_eq!(data[[0, 1, 0, 1, 0, 1]], 12);
                let expected = View::from_fn("expected", extents, six_d_value);
                assert_eq!(data.to_vec(), expected.to_vec());
                assert_eq!(data.use_count(), 1);
            }

            #[test]
            fn test_parallel_for_unmanaged_wrapper() {
                init_test_logging();
                let data = View::<u32, 3>::new("data", [4, 5, 6]);
                let w = $wrapper::new(data.make_unmanaged());
                let policy = MDRangePolicy::from_extents([4, 5, 6]);
                parallel_for("fill_3d", &policy, move |[i, j, k]| {
                    // SAFETY: every index tuple writes its own element.
                    unsafe { w.at(i).at(j).at(k).write((i * 100 + j * 10 + k) as u32) };
                });
                assert_eq!(data[[3, 4, 5]], 345);
                assert_eq!(data.use_count(), 1);
            }

            #[test]
            fn test_layout_left() {
                let data = View::<u16, 3>::with_layout("data", [2, 3, 4], Layout::Left);
                let w = $wrapper::new(data.clone());
                // SAFETY: one live handle.
                unsafe { w.at(1).at(2).at(3).write(9) };
                assert_eq!(data[[1, 2, 3]], 9);
                let ptr = w.at(1).at(2).at(3).as_ptr();
                assert_eq!(ptr, data.as_mut_ptr().wrapping_add(1 + 2 * 2 + 3 * 6));
            }

            #[test]
            fn test_f64_values() {
                let data =
                    View::from_fn("data", [3, 4], |[i, j]| i as f64 * 0.5 + j as f64 * 0.25);
                let w = $wrapper::new(data.clone());
                for i in 0..3 {
                    for j in 0..4 {
                        // SAFETY: single-threaded, one live handle.
                        unsafe { *w.at(i).at(j).as_mut() *= 2.0 };
                    }
                }
                assert_relative_eq!(data[[2, 3]], 3.5, epsilon = 1e-12);
                assert_relative_eq!(*w.at(1).at(1), 1.5, epsilon = 1e-12);
            }

            #[test]
            fn test_complex_elements() {
                let data = View::<Complex64, 2>::new("data", [2, 2]);
                let w = $wrapper::new(data.clone());
                // SAFETY: the two handles point at distinct elements.
                unsafe {
                    w.at(0).at(1).write(Complex64::new(1.0, -2.0));
                    *w.at(1).at(0).as_mut() += Complex64::new(0.0, 3.0);
                }
                assert_eq!(data[[0, 1]], Complex64::new(1.0, -2.0));
                assert_eq!(data[[1, 0]].im, 3.0);
            }

            #[test]
            fn test_borrowed_slice() {
                let mut storage = vec![0u8; 24];
                {
                    let view =
                        View::from_slice(&mut storage, [2, 3, 4], Layout::Right).unwrap();
                    let w = $wrapper::new(view);
                    let element = w.at(1).at(2).at(3);
                    // SAFETY: `element` is the only handle in use.
                    unsafe { element.write(42) };
                }
                assert_eq!(storage[23], 42);
            }

            #[test]
            #[should_panic(expected = "out of bounds")]
            fn test_out_of_range_panics() {
                let data = View::<i32, 2>::new("data", [2, 3]);
                let w = $wrapper::new(data);
                let _ = w.at(1).at(3);
            }

            rank_case!(test_rank_1, $wrapper, [5], 0);
            rank_case!(test_rank_2, $wrapper, [3, 4], 0, 1);
            rank_case!(test_rank_3, $wrapper, [2, 3, 4], 0, 1, 2);
            rank_case!(test_rank_4, $wrapper, [2, 3, 2, 3], 0, 1, 2, 3);
            rank_case!(test_rank_5, $wrapper, [2, 2, 3, 2, 2], 0, 1, 2, 3, 4);
            rank_case!(test_rank_6, $wrapper, [2, 2, 2, 2, 2, 3], 0, 1, 2, 3, 4, 5);
            rank_case!(test_rank_7, $wrapper, [2, 2, 2, 2, 2, 2, 2], 0, 1, 2, 3, 4, 5, 6);
            rank_case!(
                test_rank_8,
                $wrapper,
                [2, 2, 2, 2, 2, 2, 2, 2],
                0, 1, 2, 3, 4, 5, 6, 7
            );
        }
    };
}

bracket_suite!(subview, WrapperSubview);
bracket_suite!(array, WrapperArray);

#[test]
fn test_wrappers_agree() {
    let data = View::from_fn("data", [3, 4, 5], |[i, j, k]| (i * 20 + j * 5 + k) as i32);
    let by_slices = WrapperSubview::new(data.clone());
    let by_indices = WrapperArray::new(data.clone());
    for i in 0..3 {
        for j in 0..4 {
            for k in 0..5 {
                assert_eq!(
                    by_slices.at(i).at(j).at(k).as_ptr(),
                    by_indices.at(i).at(j).at(k).as_ptr()
                );
                assert_eq!(by_slices.at(i).at(j).rank(), by_indices.at(i).at(j).rank());
            }
        }
    }
}

#[test]
fn test_subview_pointer_tracks_slice_array_pointer_stays() {
    let data = View::<i32, 3>::new("data", [2, 3, 4]);
    let by_slices = WrapperSubview::new(data.clone());
    let by_indices = WrapperArray::new(data.clone());
    let origin = data.as_mut_ptr();
    assert_eq!(by_slices.at(1).at(2).as_mut_ptr(), origin.wrapping_add(12 + 8));
    assert_eq!(by_indices.at(1).at(2).as_mut_ptr(), origin);
}
