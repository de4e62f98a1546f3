/// 分批工具
///
/// 把有序序列切成连续、不重叠的批次，除最后一批外每批都恰好 `max_batch_size` 个。
/// `max_batch_size` 为 0 时按 1 处理。
pub fn partition<T>(items: &[T], max_batch_size: usize) -> Vec<&[T]> {
    items.chunks(max_batch_size.max(1)).collect()
}
