//! Sequential filter pipeline.

use crate::core::buffer::PixelBuffer;
use crate::core::error::{PipelineError, PipelineResult};
use crate::core::filter::Filter;
use crate::pipeline::progress::PipelineProgress;
use std::time::Instant;

/// An ordered sequence of owned filters.
///
/// Insertion order is application order. Each filter consumes the previous
/// filter's output and produces a new buffer, so the caller's input is never
/// modified. Cloning a pipeline deep-copies every filter.
#[derive(Debug, Clone, Default)]
pub struct FilterPipeline {
    filters: Vec<Box<dyn Filter>>,
}

impl FilterPipeline {
    /// Create an empty pipeline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a filter, builder style.
    pub fn with_filter(mut self, filter: impl Filter + 'static) -> Self {
        self.push(Box::new(filter));
        self
    }

    /// Append a filter.
    pub fn push(&mut self, filter: Box<dyn Filter>) {
        self.filters.push(filter);
    }

    /// Append a filter that may be absent (e.g. the result of a registry
    /// lookup). Fails with [`PipelineError::MissingFilter`] for `None`.
    pub fn add_filter(&mut self, filter: Option<Box<dyn Filter>>) -> PipelineResult<()> {
        let filter = filter.ok_or(PipelineError::MissingFilter)?;
        self.push(filter);
        Ok(())
    }

    /// Insert a filter at `index`, shifting later filters back.
    ///
    /// `index == len()` appends. Fails without modifying the pipeline if the
    /// filter is absent or `index > len()`.
    pub fn insert_filter(&mut self, index: usize, filter: Option<Box<dyn Filter>>) -> PipelineResult<()> {
        let filter = filter.ok_or(PipelineError::MissingFilter)?;
        if index > self.filters.len() {
            return Err(self.out_of_range(index));
        }
        self.filters.insert(index, filter);
        Ok(())
    }

    /// Remove and return the filter at `index`.
    pub fn remove_filter(&mut self, index: usize) -> PipelineResult<Box<dyn Filter>> {
        self.check_index(index)?;
        Ok(self.filters.remove(index))
    }

    /// Swap the filters at two positions.
    pub fn swap_filters(&mut self, first: usize, second: usize) -> PipelineResult<()> {
        self.check_index(first)?;
        self.check_index(second)?;
        self.filters.swap(first, second);
        Ok(())
    }

    /// Remove every filter.
    pub fn clear(&mut self) {
        self.filters.clear();
    }

    /// Number of filters.
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    /// Whether the pipeline has no filters.
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Borrow the filter at `index`.
    pub fn filter(&self, index: usize) -> PipelineResult<&dyn Filter> {
        self.check_index(index)?;
        Ok(self.filters[index].as_ref())
    }

    /// Mutably borrow the filter at `index`, e.g. to retune it.
    pub fn filter_mut(&mut self, index: usize) -> PipelineResult<&mut (dyn Filter + 'static)> {
        self.check_index(index)?;
        Ok(self.filters[index].as_mut())
    }

    /// Iterate over the filters in application order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn Filter> {
        self.filters.iter().map(|f| f.as_ref())
    }

    /// Name of the filter at `index`.
    pub fn filter_name(&self, index: usize) -> PipelineResult<&'static str> {
        self.filter(index).map(|f| f.name())
    }

    /// Names of all filters in application order.
    pub fn filter_names(&self) -> Vec<&'static str> {
        self.filters.iter().map(|f| f.name()).collect()
    }

    /// Run every filter in order. An empty pipeline returns a copy of the
    /// input.
    pub fn apply(&self, input: &PixelBuffer) -> PixelBuffer {
        self.apply_with_progress(input, |_| {})
    }

    /// Run every filter in order, reporting progress to `on_progress`.
    pub fn apply_with_progress<F>(&self, input: &PixelBuffer, mut on_progress: F) -> PixelBuffer
    where
        F: FnMut(PipelineProgress),
    {
        let start = Instant::now();
        let total = self.filters.len();
        on_progress(PipelineProgress::Started { total_filters: total });

        let mut current: Option<PixelBuffer> = None;
        for (index, filter) in self.filters.iter().enumerate() {
            let name = filter.name();
            on_progress(PipelineProgress::FilterStarted { index, name, total });

            let filter_start = Instant::now();
            let source = current.as_ref().unwrap_or(input);
            let output = filter.apply(source);
            let duration = filter_start.elapsed();

            log::debug!(
                "pipeline step {}/{}: {} took {:.2}ms",
                index + 1,
                total,
                name,
                duration.as_secs_f64() * 1000.0
            );
            on_progress(PipelineProgress::FilterCompleted { index, name, duration });
            current = Some(output);
        }

        let total_duration = start.elapsed();
        on_progress(PipelineProgress::Completed {
            filters_applied: total,
            total_duration,
        });

        current.unwrap_or_else(|| input.clone())
    }

    fn check_index(&self, index: usize) -> PipelineResult<()> {
        if index >= self.filters.len() {
            return Err(self.out_of_range(index));
        }
        Ok(())
    }

    fn out_of_range(&self, index: usize) -> PipelineError {
        PipelineError::IndexOutOfRange {
            index,
            len: self.filters.len(),
        }
    }
}

impl FromIterator<Box<dyn Filter>> for FilterPipeline {
    fn from_iter<I: IntoIterator<Item = Box<dyn Filter>>>(iter: I) -> Self {
        Self {
            filters: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ErrorKind;
    use crate::filters::builtin::{BrightnessAdjust, EdgeDetection, GaussianBlur};

    fn test_image() -> PixelBuffer {
        PixelBuffer::from_fn(10, 10, 1, |x, y, _| (x * 10 + y) as u8).unwrap()
    }

    fn blur() -> Box<dyn Filter> {
        Box::new(GaussianBlur::new(1.0, 3).unwrap())
    }

    fn brightness(factor: f64) -> Box<dyn Filter> {
        Box::new(BrightnessAdjust::new(factor).unwrap())
    }

    fn edges() -> Box<dyn Filter> {
        Box::new(EdgeDetection::default())
    }

    #[test]
    fn test_empty_pipeline_copies_input() {
        let pipeline = FilterPipeline::new();
        assert!(pipeline.is_empty());
        let input = PixelBuffer::from_fn(5, 5, 1, |x, y, _| (x * 5 + y) as u8).unwrap();
        let output = pipeline.apply(&input);
        assert_eq!(output, input);
    }

    #[test]
    fn test_add_filter() {
        let mut pipeline = FilterPipeline::new();
        pipeline.add_filter(Some(blur())).unwrap();
        assert_eq!(pipeline.len(), 1);
        pipeline.add_filter(Some(brightness(1.5))).unwrap();
        assert_eq!(pipeline.len(), 2);
    }

    #[test]
    fn test_add_missing_filter() {
        let mut pipeline = FilterPipeline::new();
        let err = pipeline.add_filter(None).unwrap_err();
        assert_eq!(err, PipelineError::MissingFilter);
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert!(pipeline.is_empty());
    }

    #[test]
    fn test_remove_filter() {
        let mut pipeline = FilterPipeline::new();
        pipeline.push(blur());
        pipeline.push(brightness(1.5));

        let removed = pipeline.remove_filter(0).unwrap();
        assert_eq!(removed.name(), "GaussianBlur");
        assert_eq!(pipeline.filter_names(), vec!["BrightnessAdjust"]);
        pipeline.remove_filter(0).unwrap();
        assert!(pipeline.is_empty());
    }

    #[test]
    fn test_remove_invalid_index() {
        let mut pipeline = FilterPipeline::new();
        assert_eq!(
            pipeline.remove_filter(0).unwrap_err(),
            PipelineError::IndexOutOfRange { index: 0, len: 0 }
        );
        pipeline.push(blur());
        assert_eq!(pipeline.remove_filter(1).unwrap_err().kind(), ErrorKind::OutOfRange);
        assert_eq!(pipeline.len(), 1);
    }

    #[test]
    fn test_filter_names() {
        let mut pipeline = FilterPipeline::new();
        assert!(pipeline.filter_names().is_empty());
        assert!(pipeline.filter_name(0).is_err());

        pipeline.push(blur());
        pipeline.push(edges());
        pipeline.push(brightness(1.5));

        assert_eq!(pipeline.filter_name(0).unwrap(), "GaussianBlur");
        assert_eq!(pipeline.filter_name(1).unwrap(), "EdgeDetection");
        assert!(pipeline.filter_name(3).is_err());
        assert_eq!(
            pipeline.filter_names(),
            vec!["GaussianBlur", "EdgeDetection", "BrightnessAdjust"]
        );
    }

    #[test]
    fn test_swap_filters() {
        let mut pipeline = FilterPipeline::new();
        assert!(pipeline.swap_filters(0, 1).is_err());

        pipeline.push(blur());
        assert!(pipeline.swap_filters(0, 1).is_err());
        assert!(pipeline.swap_filters(1, 0).is_err());

        pipeline.push(edges());
        pipeline.swap_filters(0, 1).unwrap();
        assert_eq!(pipeline.filter_names(), vec!["EdgeDetection", "GaussianBlur"]);
    }

    #[test]
    fn test_insert_filter_shifts_later_entries() {
        let mut pipeline = FilterPipeline::new();
        pipeline.push(blur());
        pipeline.push(brightness(1.5));

        pipeline.insert_filter(1, Some(edges())).unwrap();
        assert_eq!(pipeline.len(), 3);
        assert_eq!(
            pipeline.filter_names(),
            vec!["GaussianBlur", "EdgeDetection", "BrightnessAdjust"]
        );

        pipeline.insert_filter(3, Some(blur())).unwrap();
        assert_eq!(pipeline.filter_name(3).unwrap(), "GaussianBlur");
    }

    #[test]
    fn test_insert_invalid() {
        let mut pipeline = FilterPipeline::new();
        assert_eq!(
            pipeline.insert_filter(1, Some(blur())).unwrap_err().kind(),
            ErrorKind::OutOfRange
        );
        assert_eq!(
            pipeline.insert_filter(0, None).unwrap_err(),
            PipelineError::MissingFilter
        );
        assert!(pipeline.is_empty());
    }

    #[test]
    fn test_clear() {
        let mut pipeline = FilterPipeline::new().with_filter(EdgeDetection::default());
        pipeline.push(blur());
        assert_eq!(pipeline.len(), 2);
        pipeline.clear();
        assert!(pipeline.is_empty());
        pipeline.clear();
        assert!(pipeline.is_empty());
    }

    #[test]
    fn test_clone_is_deep() {
        let mut original = FilterPipeline::new();
        original.push(blur());
        original.push(edges());
        original.push(brightness(1.5));

        let mut cloned = original.clone();
        assert_eq!(cloned.filter_names(), original.filter_names());

        cloned
            .filter_mut(2)
            .unwrap()
            .set_parameters(&[("brightness_factor".to_string(), 3.0)].into())
            .unwrap();
        cloned.remove_filter(0).unwrap();

        assert_eq!(original.len(), 3);
        assert_eq!(original.filter(2).unwrap().parameters()["brightness_factor"], 1.5);
    }

    #[test]
    fn test_apply_preserves_shape_and_input() {
        let input = test_image();
        let snapshot = input.clone();
        let pipeline: FilterPipeline = vec![blur(), brightness(1.2), edges(), Box::new(GaussianBlur::new(0.5, 3).unwrap()) as Box<dyn Filter>]
            .into_iter()
            .collect();

        let output = pipeline.apply(&input);
        assert!(output.same_shape(&input));
        assert_eq!(input, snapshot);
    }

    #[test]
    fn test_apply_matches_manual_chain() {
        let input = test_image();
        let pipeline = FilterPipeline::new()
            .with_filter(GaussianBlur::new(1.0, 3).unwrap())
            .with_filter(BrightnessAdjust::new(1.5).unwrap());

        let manual = BrightnessAdjust::new(1.5)
            .unwrap()
            .apply(&GaussianBlur::new(1.0, 3).unwrap().apply(&input));
        assert_eq!(pipeline.apply(&input), manual);
    }

    #[test]
    fn test_order_matters() {
        let input = PixelBuffer::from_fn(10, 10, 1, |x, y, _| if x >= 5 { 100 } else { (y * 3) as u8 }).unwrap();
        let dim_first = FilterPipeline::new()
            .with_filter(BrightnessAdjust::new(0.5).unwrap())
            .with_filter(EdgeDetection::default());
        let edges_first = FilterPipeline::new()
            .with_filter(EdgeDetection::default())
            .with_filter(BrightnessAdjust::new(0.5).unwrap());

        // The step saturates the edge response before dimming, but not after.
        let a = dim_first.apply(&input);
        let b = edges_first.apply(&input);
        assert_eq!(b.get_pixel(4, 5, 0), Some(128));
        assert!(a.get_pixel(4, 5, 0).unwrap() > 128);
        assert_ne!(a, b);
    }

    #[test]
    fn test_progress_events() {
        let pipeline = FilterPipeline::new()
            .with_filter(GaussianBlur::default())
            .with_filter(EdgeDetection::default());

        let mut events = Vec::new();
        pipeline.apply_with_progress(&test_image(), |event| events.push(event));

        assert_eq!(events.len(), 6);
        assert_eq!(events[0], PipelineProgress::Started { total_filters: 2 });
        assert!(matches!(
            events[3],
            PipelineProgress::FilterStarted { index: 1, name: "EdgeDetection", total: 2 }
        ));
        assert!(matches!(
            events[5],
            PipelineProgress::Completed { filters_applied: 2, .. }
        ));
    }
}
